use serde::{Deserialize, Serialize};

use crate::table::TableRow;

/// One apartment complex discovered by the list collector.
///
/// Serialized column names follow the data portal's field names so the tables
/// stay readable next to the portal documentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecord {
    pub kapt_code: String,
    pub kapt_name: String,
    pub region: String,
    pub bjd_code: Option<String>,
    pub as1: Option<String>,
    pub as2: Option<String>,
    pub as3: Option<String>,
    pub as4: Option<String>,
    pub kapt_usedate: Option<String>,
    pub kaptda_cnt: Option<u64>,
}

impl TableRow for ListRecord {
    const COLUMNS: &'static [&'static str] = &[
        "kaptCode",
        "kaptName",
        "region",
        "bjdCode",
        "as1",
        "as2",
        "as3",
        "as4",
        "kaptUsedate",
        "kaptdaCnt",
    ];
}

/// Basic information of one apartment complex, keyed by the same `kapt_code`
/// as its [`ListRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    pub kapt_code: String,
    pub kapt_name: Option<String>,
    pub kapt_addr: Option<String>,
    pub doro_juso: Option<String>,
    pub bjd_code: Option<String>,
    pub zipcode: Option<String>,
    pub code_sale_nm: Option<String>,
    pub code_heat_nm: Option<String>,
    pub code_mgr_nm: Option<String>,
    pub code_hall_nm: Option<String>,
    pub code_apt_nm: Option<String>,
    pub kapt_tarea: Option<f64>,
    pub kapt_marea: Option<f64>,
    pub kapt_dong_cnt: Option<u64>,
    pub kaptda_cnt: Option<u64>,
    pub ho_cnt: Option<u64>,
    pub kapt_bcompany: Option<String>,
    pub kapt_acompany: Option<String>,
    pub kapt_usedate: Option<String>,
    pub kapt_top_floor: Option<u64>,
    pub kapt_base_floor: Option<u64>,
    pub ktown_flr_no: Option<u64>,
    pub kapt_tel: Option<String>,
    pub kapt_fax: Option<String>,
    pub kapt_url: Option<String>,
}

impl DetailRecord {
    /// A record carrying only the identifier.
    pub fn empty(kapt_code: &str) -> DetailRecord {
        DetailRecord {
            kapt_code: kapt_code.to_string(),
            kapt_name: None,
            kapt_addr: None,
            doro_juso: None,
            bjd_code: None,
            zipcode: None,
            code_sale_nm: None,
            code_heat_nm: None,
            code_mgr_nm: None,
            code_hall_nm: None,
            code_apt_nm: None,
            kapt_tarea: None,
            kapt_marea: None,
            kapt_dong_cnt: None,
            kaptda_cnt: None,
            ho_cnt: None,
            kapt_bcompany: None,
            kapt_acompany: None,
            kapt_usedate: None,
            kapt_top_floor: None,
            kapt_base_floor: None,
            ktown_flr_no: None,
            kapt_tel: None,
            kapt_fax: None,
            kapt_url: None,
        }
    }
}

impl TableRow for DetailRecord {
    const COLUMNS: &'static [&'static str] = &[
        "kaptCode",
        "kaptName",
        "kaptAddr",
        "doroJuso",
        "bjdCode",
        "zipcode",
        "codeSaleNm",
        "codeHeatNm",
        "codeMgrNm",
        "codeHallNm",
        "codeAptNm",
        "kaptTarea",
        "kaptMarea",
        "kaptDongCnt",
        "kaptdaCnt",
        "hoCnt",
        "kaptBcompany",
        "kaptAcompany",
        "kaptUsedate",
        "kaptTopFloor",
        "kaptBaseFloor",
        "ktownFlrNo",
        "kaptTel",
        "kaptFax",
        "kaptUrl",
    ];
}
