//! litscan-collect: Request governance and data collection against NCBI E-utilities.
//!
//! - Paced, logged HTTP requests (`requester`)
//! - Endpoint URL construction and pacing policy (`urls`)
//! - Field extraction from response documents (`process`)
//! - Provenance records (`meta_data`)
//! - Database info collection (`info`)
//! - Article count sources (`sources`)

pub mod requester;
pub mod urls;
pub mod process;
pub mod meta_data;
pub mod info;
pub mod sources;

pub use meta_data::{DbInfo, MetaData};
pub use requester::{Page, Requester, RequesterSummary};
pub use sources::{CountSource, EUtilsCounter};
pub use urls::{get_wait_time, EUtils};
