//! esearch-backed article counts.

use async_trait::async_trait;
use litscan_common::error::{RequestError, Result};
use litscan_common::CollectionConfig;
use tracing::{debug, instrument};
use url::Url;

use super::CountSource;
use crate::info::get_db_info;
use crate::meta_data::DbInfo;
use crate::process::parse_count;
use crate::requester::{Requester, RequesterSummary};
use crate::urls::EUtils;

pub struct EUtilsCounter {
    req: Requester,
    search_url: Url,
    info_url: String,
}

impl EUtilsCounter {
    pub fn new(req: Requester, urls: EUtils) -> Result<Self> {
        let mut urls = urls.with_setting("rettype", "count");

        let keys = urls.present(&["db", "retmode", "rettype", "field", "api_key"]);
        urls.build_url("search", &keys)?;
        let keys = urls.present(&["db", "api_key"]);
        urls.build_url("info", &keys)?;

        Ok(Self {
            req,
            search_url: urls.url("search")?,
            info_url: urls.get_url("info", &[])?,
        })
    }

    /// Requester paced by the config override, or by the API-key pacing rule.
    pub fn from_config(config: &CollectionConfig) -> Result<Self> {
        let urls = EUtils::from_config(config)?;
        let wait_time = config.wait_time_override()?.unwrap_or_else(|| urls.wait_time());
        let req = Requester::with_timeout(
            wait_time,
            config.logging,
            config.log_folder.as_deref(),
            config.timeout(),
        )?;
        Self::new(req, urls)
    }

    pub fn requester(&self) -> &Requester {
        &self.req
    }

    pub async fn db_info(&mut self) -> std::result::Result<DbInfo, RequestError> {
        get_db_info(&mut self.req, &self.info_url).await
    }

    /// Release the requester and its log handle.
    pub fn close(self) -> RequesterSummary {
        self.req.close()
    }
}

#[async_trait]
impl CountSource for EUtilsCounter {
    #[instrument(skip(self))]
    async fn search_count(&mut self, query: &str) -> std::result::Result<u64, RequestError> {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair("term", query);
        let page = self.req.request_url(url.as_str()).await?;

        let count = parse_count(&page.content).ok_or_else(|| RequestError::Parse {
            url: page.url.clone(),
            reason: "no article count in response".to_string(),
        })?;
        debug!(count, "esearch count");
        Ok(count)
    }
}
