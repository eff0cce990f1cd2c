use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use log::debug;

use crate::error::TextureError;

/// Reverses row order in place so row 0 becomes the bottom of the image.
///
/// Decoders hand rows out top-first while texture coordinates in the vertex
/// tables put `v = 0` at the bottom. Applying the flip twice is a no-op.
pub fn flip_vertically(pixels: &mut [u8], width: u32, height: u32, channels: u8) {
    let row = width as usize * channels as usize;
    let height = height as usize;
    debug_assert!(pixels.len() >= row * height);
    for j in 0..height / 2 {
        let (top, bottom) = pixels.split_at_mut((height - 1 - j) * row);
        top[j * row..(j + 1) * row].swap_with_slice(&mut bottom[..row]);
    }
}

/// Number of mip levels down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Decoded, bottom-up pixel data with 3 or 4 channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl DecodedImage {
    pub fn from_path(path: &Path) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path)?;
        Self::from_memory(&bytes)
    }

    pub fn from_memory(bytes: &[u8]) -> Result<Self, TextureError> {
        Self::from_dynamic(image::load_from_memory(bytes)?)
    }

    pub fn from_dynamic(image: DynamicImage) -> Result<Self, TextureError> {
        let (width, height) = (image.width(), image.height());
        let channels = image.color().channel_count();
        let mut pixels = match channels {
            3 => image.into_rgb8().into_raw(),
            4 => image.into_rgba8().into_raw(),
            _ => return Err(TextureError::UnsupportedChannelLayout { channels }),
        };
        flip_vertically(&mut pixels, width, height, channels);
        Ok(Self {
            pixels,
            width,
            height,
            channels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Base level widened to RGBA; RGB input gets an opaque alpha.
    pub fn to_rgba(&self) -> RgbaImage {
        let channels = self.channels as usize;
        let width = self.width as usize;
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let i = (y as usize * width + x as usize) * channels;
            let alpha = if channels == 4 { self.pixels[i + 3] } else { u8::MAX };
            Rgba([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], alpha])
        })
    }

    /// Full mip chain, each level resampled from the base image.
    pub fn mip_chain(&self) -> Vec<RgbaImage> {
        let base = self.to_rgba();
        let levels = mip_level_count(self.width, self.height);
        let mut chain = Vec::with_capacity(levels as usize);
        for level in 1..levels {
            let width = (self.width >> level).max(1);
            let height = (self.height >> level).max(1);
            chain.push(image::imageops::resize(&base, width, height, FilterType::Triangle));
        }
        chain.insert(0, base);
        chain
    }
}

/// Repeat wrapping with bilinear filtering of the base level. The lod clamp
/// keeps the sampler on level 0 even though the whole chain is uploaded.
pub fn sampler_descriptor(label: &str) -> wgpu::SamplerDescriptor<'_> {
    wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        lod_min_clamp: 0.0,
        lod_max_clamp: 0.0,
        ..Default::default()
    }
}

/// Sampled 2D texture holding linear (non-sRGB) texels.
pub struct Texture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl Texture {
    /// Texels are sampled as stored, so the shader multiplies raw byte
    /// values by the lighting factor.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Decodes `path` and uploads it. The decoded pixels are dropped on return.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, TextureError> {
        let image = DecodedImage::from_path(path)?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "texture".to_string());
        Ok(Self::upload(device, queue, &image, &label))
    }

    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
        label: &str,
    ) -> Self {
        let levels = image.mip_chain();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, pixels) in levels.iter().enumerate() {
            let (width, height) = pixels.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&sampler_descriptor(label));

        debug!(
            "uploaded texture {label}: {}x{}, {} channel(s), {} mip level(s)",
            image.width(),
            image.height(),
            image.channels(),
            levels.len()
        );

        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }

    /// Frees the GPU allocation.
    pub fn destroy(self) {
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{GrayAlphaImage, GrayImage, ImageFormat, RgbImage};

    use super::*;

    fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 251) as u8).collect()
    }

    #[test]
    fn flip_twice_is_identity() {
        for (width, height, channels) in [(1, 1, 3), (3, 2, 4), (5, 7, 3), (4, 4, 4), (2, 9, 1)] {
            let original = patterned(width * height * channels);
            let mut pixels = original.clone();
            flip_vertically(&mut pixels, width as u32, height as u32, channels as u8);
            flip_vertically(&mut pixels, width as u32, height as u32, channels as u8);
            assert_eq!(pixels, original, "{width}x{height}x{channels}");
        }
    }

    #[test]
    fn flip_swaps_rows_and_keeps_middle() {
        // 1 pixel wide, 3 rows, RGB
        let mut pixels = vec![1, 1, 1, 2, 2, 2, 3, 3, 3];
        flip_vertically(&mut pixels, 1, 3, 3);
        assert_eq!(pixels, vec![3, 3, 3, 2, 2, 2, 1, 1, 1]);
    }

    #[test]
    fn rgb_and_rgba_decode() {
        let rgb = RgbImage::from_fn(2, 2, |_, y| image::Rgb([y as u8 * 100, 0, 0]));
        let decoded =
            DecodedImage::from_memory(&encode_png(DynamicImage::ImageRgb8(rgb))).unwrap();
        assert_eq!(decoded.channels(), 3);
        // top row of the file ends up last
        assert_eq!(&decoded.pixels()[..3], &[100, 0, 0]);
        assert_eq!(&decoded.pixels()[6..9], &[0, 0, 0]);

        let rgba = RgbaImage::from_pixel(3, 1, Rgba([1, 2, 3, 4]));
        let decoded =
            DecodedImage::from_memory(&encode_png(DynamicImage::ImageRgba8(rgba))).unwrap();
        assert_eq!(decoded.channels(), 4);
        assert_eq!(decoded.pixels().len(), 12);
    }

    #[test]
    fn grey_images_are_rejected() {
        let luma = encode_png(DynamicImage::ImageLuma8(GrayImage::new(2, 2)));
        assert!(matches!(
            DecodedImage::from_memory(&luma),
            Err(TextureError::UnsupportedChannelLayout { channels: 1 })
        ));
        let luma_alpha = encode_png(DynamicImage::ImageLumaA8(GrayAlphaImage::new(2, 2)));
        assert!(matches!(
            DecodedImage::from_memory(&luma_alpha),
            Err(TextureError::UnsupportedChannelLayout { channels: 2 })
        ));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            DecodedImage::from_memory(b"not an image"),
            Err(TextureError::Decode(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DecodedImage::from_path(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, TextureError::Io(_)));
    }

    #[test]
    fn rgb_is_widened_with_opaque_alpha() {
        let rgb = RgbImage::from_pixel(2, 1, image::Rgb([9, 8, 7]));
        let decoded = DecodedImage::from_dynamic(DynamicImage::ImageRgb8(rgb)).unwrap();
        let rgba = decoded.to_rgba();
        assert_eq!(rgba.get_pixel(1, 0), &Rgba([9, 8, 7, 255]));
    }

    #[test]
    fn mip_chain_halves_to_one_texel() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(640, 480), 10);

        let image = RgbaImage::from_pixel(8, 2, Rgba([255, 0, 0, 255]));
        let decoded = DecodedImage::from_dynamic(DynamicImage::ImageRgba8(image)).unwrap();
        let dims: Vec<(u32, u32)> = decoded.mip_chain().iter().map(|l| l.dimensions()).collect();
        assert_eq!(dims, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn sampler_reads_base_level_only() {
        let desc = sampler_descriptor("desk.png");
        assert_eq!(desc.label, Some("desk.png"));
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::Repeat);
        assert_eq!(desc.mag_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.mipmap_filter, wgpu::FilterMode::Nearest);
        assert_eq!(desc.lod_max_clamp, 0.0);
    }

    #[test]
    fn texels_are_not_srgb_encoded() {
        assert!(!Texture::FORMAT.is_srgb());
    }
}
