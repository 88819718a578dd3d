//! Application layer: the settings load pipeline.
//!
//! A load is one strictly ordered pass:
//!
//! ```text
//! DocumentStore ─► layering (defaults, then user) ─► dynamic profiles
//!               ─► validation chain ─► Settings (published)
//! ```
//!
//! Every stage takes the [`result_set::ResultSet`] by value or by `&mut`
//! and hands it to the next one; nothing is shared between loads.  Code in
//! this layer depends only on traits ([`dynamic_profiles::ProfileGenerator`],
//! [`persistence::SettingsPersistence`], [`validation::ResourceProbe`]);
//! file-backed implementations live in `infrastructure`.
//!
//! # Sub-modules
//!
//! - **`document_store`**   – The parsed default and user documents.
//! - **`result_set`**       – The accumulator threaded through every stage.
//! - **`matcher`**          – Decides which existing profile an entry refers to.
//! - **`layering`**         – Applies one document onto the result set.
//! - **`dynamic_profiles`** – Runs profile generators.
//! - **`validation`**       – The ordered repair/warn/fail chain.
//! - **`settings`**         – The published, read-only facade.
//! - **`load_settings`**    – Wires the stages into the three load flavours.
//! - **`current`**          – The process-wide "current settings" handle.
//! - **`persistence`**      – The user-document read/write contract.

pub mod current;
pub mod document_store;
pub mod dynamic_profiles;
pub mod layering;
pub mod load_settings;
pub mod matcher;
pub mod persistence;
pub mod result_set;
pub mod settings;
pub mod validation;
