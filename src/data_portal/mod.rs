pub mod data_portal;
pub mod helpers;
pub mod responses;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{apartment::DetailRecord, region::Region},
};
use responses::ListPage;

/// Where the collectors get their records from.
///
/// [`data_portal::DataPortal`] talks to the public API; tests substitute an
/// in-memory source.
#[async_trait]
pub trait AptSource: Send + Sync {
    /// Page `page_no` (1-based) of the complexes in `region`.
    async fn fetch_list_page(&self, region: &Region, page_no: u32, page_size: u32)
        -> Result<ListPage>;

    /// Basic information for one complex.
    async fn fetch_detail(&self, kapt_code: &str) -> Result<DetailRecord>;
}
