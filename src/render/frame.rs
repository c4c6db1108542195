use std::convert::Infallible;

use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use image::RgbImage;

use super::Color;

/// A rendered width x height RGB picture.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Every pixel starts as `background`.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, background.into()),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Panics when out of bounds, like `RgbImage::get_pixel`.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        Color(self.image.get_pixel(x, y).0)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width() && y < self.height() {
            self.image.put_pixel(x, y, color.into());
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

impl DrawTarget for Frame {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // clipped silently, labels may hang off the edge
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                self.set_pixel(x, y, Color::rgb(color.r(), color.g(), color.b()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn draw_target_clips_to_bounds() {
        let bg = Color::rgb(1, 2, 3);
        let red = Color::rgb(255, 0, 0);
        let mut frame = Frame::new(4, 4, bg);

        Rectangle::new(Point::new(-2, 2), Size::new(10, 10))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::from(red)))
            .draw(&mut frame)
            .unwrap();

        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 4);
        assert_eq!(frame.pixel(0, 1), bg);
        assert_eq!(frame.pixel(0, 2), red);
        assert_eq!(frame.pixel(3, 3), red);
    }
}
