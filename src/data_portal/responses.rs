//! Wire shapes of the data portal's JSON responses.
//!
//! Every response is wrapped as `{"response": {"header": {...}, "body": {...}}}`.
//! Item schemas are explicit: a row without its identifier fails the whole
//! response instead of reaching the tables.

use serde::Deserialize;
use serde_this_or_that::as_u64;

use super::helpers::{
    is_success_code, opt_f64, opt_string, opt_u64, required_string, xml_error_message,
};
use crate::{
    error::{CollectError, Result},
    models::{
        apartment::{DetailRecord, ListRecord},
        region::Region,
    },
};

#[derive(Debug, Deserialize)]
struct Envelope<B> {
    response: PortalResponse<B>,
}

#[derive(Debug, Deserialize)]
struct PortalResponse<B> {
    header: Header,
    body: Option<B>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    #[serde(deserialize_with = "required_string")]
    result_code: String,
    #[serde(default, deserialize_with = "opt_string")]
    result_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Items<T> {
    List(Vec<T>),
    Wrapped {
        #[serde(default = "Option::default")]
        item: Option<OneOrMany<T>>,
    },
    // No rows: the portal sends `"items": ""`
    Blank(String),
}

impl<T> Items<T> {
    fn into_vec(self) -> Result<Vec<T>> {
        match self {
            Items::List(items) => Ok(items),
            Items::Wrapped {
                item: Some(OneOrMany::Many(items)),
            } => Ok(items),
            Items::Wrapped {
                item: Some(OneOrMany::One(item)),
            } => Ok(vec![item]),
            Items::Wrapped { item: None } => Ok(Vec::new()),
            Items::Blank(text) if text.trim().is_empty() => Ok(Vec::new()),
            Items::Blank(text) => Err(CollectError::Api(format!(
                "unexpected items value: {}",
                text.chars().take(200).collect::<String>()
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListBody {
    #[serde(default = "Option::default")]
    items: Option<Items<ListItem>>,
    #[serde(default, deserialize_with = "as_u64")]
    total_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListItem {
    #[serde(deserialize_with = "required_string")]
    kapt_code: String,
    #[serde(default, deserialize_with = "opt_string")]
    kapt_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    bjd_code: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    as1: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    as2: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    as3: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    as4: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    kapt_usedate: Option<String>,
    #[serde(default, deserialize_with = "opt_u64")]
    kaptda_cnt: Option<u64>,
}

impl ListItem {
    fn into_record(self, region: &Region) -> ListRecord {
        ListRecord {
            kapt_code: self.kapt_code,
            kapt_name: self.kapt_name.unwrap_or_default(),
            region: region.code().to_string(),
            bjd_code: self.bjd_code,
            as1: self.as1,
            as2: self.as2,
            as3: self.as3,
            as4: self.as4,
            kapt_usedate: self.kapt_usedate,
            kaptda_cnt: self.kaptda_cnt,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailBody {
    #[serde(default = "Option::default")]
    item: Option<DetailItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailItem {
    #[serde(deserialize_with = "required_string")]
    kapt_code: String,
    #[serde(default, deserialize_with = "opt_string")]
    kapt_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    kapt_addr: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    doro_juso: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    bjd_code: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    zipcode: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    code_sale_nm: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    code_heat_nm: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    code_mgr_nm: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    code_hall_nm: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    code_apt_nm: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    kapt_tarea: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    kapt_marea: Option<f64>,
    #[serde(default, deserialize_with = "opt_u64")]
    kapt_dong_cnt: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64")]
    kaptda_cnt: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64")]
    ho_cnt: Option<u64>,
    #[serde(default, deserialize_with = "opt_string")]
    kapt_bcompany: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    kapt_acompany: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    kapt_usedate: Option<String>,
    #[serde(default, deserialize_with = "opt_u64")]
    kapt_top_floor: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64")]
    kapt_base_floor: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64")]
    ktown_flr_no: Option<u64>,
    #[serde(default, deserialize_with = "opt_string")]
    kapt_tel: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    kapt_fax: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    kapt_url: Option<String>,
}

impl From<DetailItem> for DetailRecord {
    fn from(item: DetailItem) -> Self {
        DetailRecord {
            kapt_code: item.kapt_code,
            kapt_name: item.kapt_name,
            kapt_addr: item.kapt_addr,
            doro_juso: item.doro_juso,
            bjd_code: item.bjd_code,
            zipcode: item.zipcode,
            code_sale_nm: item.code_sale_nm,
            code_heat_nm: item.code_heat_nm,
            code_mgr_nm: item.code_mgr_nm,
            code_hall_nm: item.code_hall_nm,
            code_apt_nm: item.code_apt_nm,
            kapt_tarea: item.kapt_tarea,
            kapt_marea: item.kapt_marea,
            kapt_dong_cnt: item.kapt_dong_cnt,
            kaptda_cnt: item.kaptda_cnt,
            ho_cnt: item.ho_cnt,
            kapt_bcompany: item.kapt_bcompany,
            kapt_acompany: item.kapt_acompany,
            kapt_usedate: item.kapt_usedate,
            kapt_top_floor: item.kapt_top_floor,
            kapt_base_floor: item.kapt_base_floor,
            ktown_flr_no: item.ktown_flr_no,
            kapt_tel: item.kapt_tel,
            kapt_fax: item.kapt_fax,
            kapt_url: item.kapt_url,
        }
    }
}

/// One page of the list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub records: Vec<ListRecord>,
    /// Rows the portal reports for the whole query, when it reports any.
    pub total_count: Option<u64>,
}

fn parse_envelope<B: serde::de::DeserializeOwned>(body: &str) -> Result<Option<B>> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        return Err(CollectError::Api(xml_error_message(trimmed)));
    }

    let envelope: Envelope<B> = serde_json::from_str(trimmed)
        .map_err(|e| CollectError::Api(format!("unexpected response shape: {e}")))?;

    let header = envelope.response.header;
    if !is_success_code(&header.result_code) {
        return Err(CollectError::Api(format!(
            "{} (result code {})",
            header.result_msg.unwrap_or_default(),
            header.result_code
        )));
    }

    Ok(envelope.response.body)
}

pub fn parse_list_page(body: &str, region: &Region) -> Result<ListPage> {
    let list_body: Option<ListBody> = parse_envelope(body)?;

    Ok(match list_body {
        Some(list_body) => ListPage {
            records: list_body
                .items
                .map(Items::into_vec)
                .transpose()?
                .unwrap_or_default()
                .into_iter()
                .map(|item| item.into_record(region))
                .collect(),
            total_count: Some(list_body.total_count).filter(|count| *count > 0),
        },
        None => ListPage {
            records: Vec::new(),
            total_count: None,
        },
    })
}

pub fn parse_detail(body: &str, kapt_code: &str) -> Result<DetailRecord> {
    let detail_body: Option<DetailBody> = parse_envelope(body)?;

    detail_body
        .and_then(|detail_body| detail_body.item)
        .map(DetailRecord::from)
        .ok_or_else(|| CollectError::Api(format!("no detail returned for {kapt_code}")))
}
