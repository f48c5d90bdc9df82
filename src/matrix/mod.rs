//! Non-owning column-major matrix descriptions
//!
//! A [`Layout`] is pure metadata (shape, leading dimension, transpose flag).
//! [`MatrixView`] and [`MatrixViewMut`] pair a layout with a borrowed buffer
//! and are what the engines accept. Neither ever copies the buffer.

mod layout;
mod view;

pub use layout::Layout;
pub use view::{MatrixView, MatrixViewMut};
