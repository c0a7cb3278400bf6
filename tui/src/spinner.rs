//! Loading spinner
//!
//! Frames are chosen from the app's tick counter, so advancing the spinner
//! never touches session state.

/// Braille dot spinner
pub const DOT: Spinner = Spinner {
    frames: &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"],
};

#[derive(Clone, Copy, Debug)]
pub struct Spinner {
    frames: &'static [&'static str],
}

impl Spinner {
    /// Frame for a given tick
    pub fn frame(&self, tick: u64) -> &'static str {
        self.frames[(tick % self.frames.len() as u64) as usize]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
