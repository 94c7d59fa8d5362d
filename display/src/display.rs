use log::info;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{TextureValueError, WindowCanvas};
use sdl2::video::WindowBuildError;
use sdl2::IntegerOrSdlError;
use thiserror::Error;

use engine::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use engine::FrameBuffer;

const BYTES_PER_PIXEL: usize = 3;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("sdl2: {0}")]
    Sdl(String),

    #[error(transparent)]
    Window(#[from] WindowBuildError),

    #[error(transparent)]
    Canvas(#[from] IntegerOrSdlError),

    #[error(transparent)]
    Texture(#[from] TextureValueError),
}

/// RGB colours for lit and unlit pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub on: [u8; 3],
    pub off: [u8; 3],
}

impl Palette {
    /// Swaps the lit and unlit colours.
    pub fn inverted(self) -> Self {
        Palette {
            on: self.off,
            off: self.on,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            on: [0xFF; 3],
            off: [0x00; 3],
        }
    }
}

/// # Display
/// The Chip-8 display is composed of 64x32 pixels black/white pixels.
/// The on/off state of these pixels is encoded as 1/0 respectively in a 2d array of 64x32 bits.
/// The display only gets a call to `render` when at least one frame has come due.
pub struct Display {
    canvas: WindowCanvas,
    palette: Palette,
}

impl Display {
    /// Creates a new display object bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `title` the window title
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, title: &str, scale: u32) -> Result<Self, DisplayError> {
        let video_subsystem = sdl.video().map_err(DisplayError::Sdl)?;
        let window = video_subsystem
            .window(
                title,
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .resizable()
            .build()?;
        let canvas = window.into_canvas().build()?;
        info!("opened {}x{} window", DISPLAY_WIDTH as u32 * scale, DISPLAY_HEIGHT as u32 * scale);

        Ok(Display {
            canvas,
            palette: Palette::default(),
        })
    }

    pub fn with_palette(self, palette: Palette) -> Self {
        Display { palette, ..self }
    }

    /// Formats a Chip-8 FrameBuffer for rendering as an SDL2 texture.
    ///
    /// An SDL2 RGB24 texture is a 1D array of bytes that represent concatenated rows of RGB pixels.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    /// * `palette` the colours of lit and unlit pixels
    fn frame_to_rgb24(frame: &FrameBuffer, palette: &Palette) -> Vec<u8> {
        frame
            .iter()
            .flat_map(|row| row.iter())
            .flat_map(|&pixel| if pixel == 1 { palette.on } else { palette.off })
            .collect()
    }

    /// Formats the Chip-8 FrameBuffer as an SDL2 RGB24 texture and presents it.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGB24,
            DISPLAY_WIDTH as u32,
            DISPLAY_HEIGHT as u32,
        )?;

        let pixels = Display::frame_to_rgb24(frame, &self.palette);
        texture
            .update(None, &pixels, DISPLAY_WIDTH * BYTES_PER_PIXEL)
            .map_err(|e| DisplayError::Sdl(e.to_string()))?;

        self.canvas
            .copy(&texture, None, None)
            .map_err(DisplayError::Sdl)?;
        self.canvas.present();
        Ok(())
    }
}
