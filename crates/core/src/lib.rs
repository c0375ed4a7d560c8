pub mod config;
pub mod detect;
pub mod epub;
pub mod error;
pub mod extract;
pub mod pdf;
pub mod security;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::extract::ExtractOptions;
    pub use crate::pdf::{PageRenderer, PdfiumRenderer};
    pub use crate::session::{DropOutcome, Session};
}
