//! Localization for the parlance engine.
//!
//! This crate provides:
//!
//! - **Labels**: label keys and their locale and interface scoped texts
//! - **Store**: persistence of labels by namespace
//! - **Translator**: total resolution of a key for a user, with
//!   positional arguments

pub mod error;
pub mod key;
pub mod label;
pub mod store;
pub mod translator;

pub use error::TranslatorError;
pub use key::I18nLabelKey;
pub use label::{I18nLabel, I18nLocalizedLabel};
pub use store::{I18nLabelStore, InMemoryI18nStore};
pub use translator::{LabelTranslator, Translator, format_label};
