use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use gc_core::error::CoreError;
use gc_core::frame::Frame;

/// Resizer réutilisable wrappant fast_image_resize (Lanczos3, RGB 8 bits).
///
/// Garde ses buffers de travail entre deux appels ; le résultat ne dépend
/// que de la frame et des dimensions demandées.
///
/// # Example
/// ```
/// use gc_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch image for source (owned buffer to avoid the mut borrow issue).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new Lanczos3 resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new()
                .resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
            src_buf: Vec::new(),
        }
    }

    /// Resample `src` to exactly `out_w × out_h`.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] if a target dimension is zero, or if
    /// the source frame is empty or its buffer does not match its size.
    ///
    /// # Example
    /// ```
    /// use gc_source::resize::Resizer;
    /// use gc_core::frame::Frame;
    /// let mut r = Resizer::new();
    /// let out = r.resize(&Frame::new(640, 480), 60, 34).unwrap();
    /// assert_eq!((out.width, out.height), (60, 34));
    /// assert!(r.resize(&Frame::new(640, 480), 0, 34).is_err());
    /// ```
    pub fn resize(&mut self, src: &Frame, out_w: u32, out_h: u32) -> Result<Frame, CoreError> {
        if out_w == 0 || out_h == 0 {
            return Err(CoreError::InvalidDimensions {
                width: out_w,
                height: out_h,
            });
        }
        let mut dst = Frame::new(out_w, out_h);
        self.resize_into(src, &mut dst)?;
        Ok(dst)
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] on empty or inconsistent buffers.
    pub fn resize_into(&mut self, src: &Frame, dst: &mut Frame) -> Result<(), CoreError> {
        check_buffer(src)?;
        check_buffer(dst)?;

        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        // fast_image_resize veut un &mut sur la source
        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8x3)
                .map_err(|_| invalid(src))?;

        let (dst_w, dst_h) = (dst.width, dst.height);
        let mut dst_image = Image::from_slice_u8(dst_w, dst_h, &mut dst.data, PixelType::U8x3)
            .map_err(|_| CoreError::InvalidDimensions {
                width: dst_w,
                height: dst_h,
            })?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .map_err(|e| {
                log::error!("Resize {}x{} → {dst_w}x{dst_h} échoué : {e}", src.width, src.height);
                CoreError::InvalidDimensions {
                    width: dst_w,
                    height: dst_h,
                }
            })?;

        Ok(())
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(frame: &Frame) -> CoreError {
    CoreError::InvalidDimensions {
        width: frame.width,
        height: frame.height,
    }
}

fn check_buffer(frame: &Frame) -> Result<(), CoreError> {
    if frame.is_empty() || frame.data.len() != frame.width as usize * frame.height as usize * 3 {
        return Err(invalid(frame));
    }
    Ok(())
}

/// Convenience for one-shot usage. DO NOT use in hot path.
///
/// # Errors
/// See [`Resizer::resize`].
///
/// # Example
/// ```
/// use gc_source::resize::resize_frame;
/// use gc_core::frame::Frame;
/// let src = Frame::new(100, 100);
/// let dst = resize_frame(&src, 50, 50).unwrap();
/// assert_eq!(dst.width, 50);
/// ```
pub fn resize_frame(src: &Frame, width: u32, height: u32) -> Result<Frame, CoreError> {
    Resizer::new().resize(src, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_has_requested_size() {
        let mut r = Resizer::new();
        let src = Frame::filled(640, 480, (12, 34, 56));
        for (w, h) in [(1, 1), (20, 10), (120, 70), (640, 480), (1000, 900)] {
            let out = r.resize(&src, w, h).unwrap();
            assert_eq!((out.width, out.height), (w, h));
            assert_eq!(out.data.len(), (w * h * 3) as usize);
        }
    }

    #[test]
    fn flat_color_survives_lanczos() {
        let src = Frame::filled(64, 48, (200, 100, 50));
        let out = resize_frame(&src, 16, 12).unwrap();
        for px in out.data.chunks_exact(3) {
            assert_eq!(px, [200, 100, 50]);
        }
    }

    #[test]
    fn zero_target_rejected() {
        let src = Frame::new(10, 10);
        assert_eq!(
            resize_frame(&src, 0, 5),
            Err(CoreError::InvalidDimensions {
                width: 0,
                height: 5
            })
        );
        assert!(resize_frame(&src, 5, 0).is_err());
    }

    #[test]
    fn empty_source_rejected() {
        let src = Frame::new(0, 10);
        assert!(resize_frame(&src, 5, 5).is_err());
    }

    #[test]
    fn corrupt_source_rejected() {
        let src = Frame {
            data: vec![0; 10],
            width: 4,
            height: 4,
        };
        assert!(resize_frame(&src, 2, 2).is_err());
    }
}
