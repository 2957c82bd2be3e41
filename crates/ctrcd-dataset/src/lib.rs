//! Clinical dataset ingestion and cleaning for the CTRCD risk pipeline.
//!
//! This crate owns the vocabulary of expected clinical columns and the
//! tolerant CSV reader that turns loosely-formatted exports into a numeric
//! column store.
//!
//! # Overview
//!
//! Source files come from echocardiography lab exports with unreliable
//! formatting: the delimiter may be a comma or a semicolon, decimals may use
//! a comma, and headers vary between sites. The ingestion path is:
//!
//! 1. **Parse** ([`ingest::read_clinical_csv`]): delimiter sniffing with
//!    fallback attempts, header unification via field aliases, numeric
//!    coercion with NaN for anything unparseable
//! 2. **Clean** ([`clean::clean_table`]): plausible-range filtering and
//!    binary-domain restriction, replacing implausible values with NaN
//!
//! # Missing data
//!
//! NaN is the missing-value sentinel throughout the pipeline. Cleaning never
//! clips: an out-of-range measurement becomes missing rather than being
//! forced to a bound.
//!
//! # Examples
//!
//! ```no_run
//! use ctrcd_dataset::{clean, field::ClinicalField, ingest};
//!
//! let mut table = ingest::read_clinical_csv("patients.csv")?;
//! clean::clean_table(&mut table);
//!
//! if let Some(ages) = table.column(ClinicalField::Age) {
//!     let present = ages.iter().filter(|a| !a.is_nan()).count();
//!     println!("{present} patients with a valid age");
//! }
//! # Ok::<(), ctrcd_dataset::ingest::IngestError>(())
//! ```

pub mod clean;
pub mod field;
pub mod ingest;
pub mod table;

pub use self::{field::ClinicalField, table::ClinicalTable};
