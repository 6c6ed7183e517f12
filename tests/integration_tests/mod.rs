pub mod common;
mod image_format;
mod round_trip;
