// isopack/src/progress.rs

/// Receives progress events while an image is planned and written. The
/// library never draws anything itself; frontends decide how to render.
pub trait Progress {
    /// Reports the total number of files about to be added.
    fn begin_populate(&mut self, total_files: u64) {
        let _ = total_files;
    }

    /// One file entry was added to the image.
    fn file_added(&mut self, destination: &str) {
        let _ = destination;
    }

    /// Serialization of the image is starting.
    fn begin_write(&mut self) {}

    /// The write phase ended, successfully or not. The output has not
    /// been renamed into place yet when this fires.
    fn finish_write(&mut self) {}
}

/// Ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}
