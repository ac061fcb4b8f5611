//! Database info collection via einfo.

use litscan_common::error::{RequestError, Result};
use litscan_common::CollectionConfig;
use tracing::{info, instrument};

use crate::meta_data::{DbInfo, MetaData};
use crate::requester::Requester;
use crate::urls::EUtils;

/// Collect information about the configured database.
#[instrument(skip(config), fields(db = %config.db))]
pub async fn collect_info(config: &CollectionConfig) -> Result<MetaData> {
    let mut urls = EUtils::from_config(config)?;
    let keys = urls.present(&["db", "api_key"]);
    urls.build_url("info", &keys)?;

    let wait_time = config.wait_time_override()?.unwrap_or_else(|| urls.wait_time());
    let mut req = Requester::with_timeout(
        wait_time,
        config.logging,
        config.log_folder.as_deref(),
        config.timeout(),
    )?;

    info!("Gathering info on {} database", config.db);
    let db_info = get_db_info(&mut req, &urls.get_url("info", &[])?).await?;

    Ok(MetaData::new(Some(db_info), req.close()))
}

/// Request einfo and read the database description out of it.
pub async fn get_db_info(req: &mut Requester, info_url: &str) -> std::result::Result<DbInfo, RequestError> {
    let page = req.request_url(info_url).await?;
    Ok(DbInfo::from_document(&page.content))
}
