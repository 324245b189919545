use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;

use super::{
    helpers::decode_service_key,
    responses::{parse_detail, parse_list_page, ListPage},
    AptSource,
};
use crate::{
    config::Config,
    error::{CollectError, Result},
    models::{apartment::DetailRecord, region::Region},
};

const LIST_PATH: &str = "AptListService3/getSigunguAptList3";
const DETAIL_PATH: &str = "AptBasisInfoServiceV4/getAphusBassInfoV4";

/// Client for the apartment complex services of the public data portal.
#[derive(Debug, Clone)]
pub struct DataPortal {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl DataPortal {
    pub fn new(config: &Config, service_key: &str) -> Result<DataPortal> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| CollectError::Configuration(format!("failed to build http client: {e}")))?;

        Ok(DataPortal {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: decode_service_key(service_key)?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let mut query: Vec<(&str, &str)> =
            vec![("serviceKey", self.service_key.as_str()), ("_type", "json")];
        query.extend_from_slice(params);

        debug!("GET {} {:?}", path, params);

        let response = self
            .client
            .get(self.endpoint(path))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(CollectError::Api(format!(
                "{} responded with {}: {}",
                path,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl AptSource for DataPortal {
    async fn fetch_list_page(
        &self,
        region: &Region,
        page_no: u32,
        page_size: u32,
    ) -> Result<ListPage> {
        let page_no = page_no.to_string();
        let page_size = page_size.to_string();
        let params: Vec<(&str, &str)> = vec![
            ("sigunguCode", region.code()),
            ("pageNo", &page_no),
            ("numOfRows", &page_size),
        ];

        let body = self.get(LIST_PATH, &params).await?;
        parse_list_page(&body, region)
    }

    async fn fetch_detail(&self, kapt_code: &str) -> Result<DetailRecord> {
        let params: Vec<(&str, &str)> = vec![("kaptCode", kapt_code)];

        let body = self.get(DETAIL_PATH, &params).await?;
        parse_detail(&body, kapt_code)
    }
}
