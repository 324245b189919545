#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use aptinfo::{
    data_portal::{responses::ListPage, AptSource},
    models::{
        apartment::{DetailRecord, ListRecord},
        region::Region,
    },
    CollectError, Result,
};

pub fn list_record(code: &str, region: &str) -> ListRecord {
    ListRecord {
        kapt_code: code.to_string(),
        kapt_name: format!("단지 {code}"),
        region: region.to_string(),
        bjd_code: Some(format!("{region}10100")),
        as1: Some("서울특별시".to_string()),
        as2: Some("종로구".to_string()),
        as3: None,
        as4: None,
        kapt_usedate: None,
        kaptda_cnt: None,
    }
}

pub fn detail_record(code: &str) -> DetailRecord {
    let mut detail = DetailRecord::empty(code);
    detail.kapt_name = Some(format!("단지 {code}"));
    detail.kapt_addr = Some(format!("서울특별시 종로구 내수동 {code}"));
    detail.code_heat_nm = Some("개별난방".to_string());
    detail.code_apt_nm = Some("아파트".to_string());
    detail.kapt_tarea = Some(12345.67);
    detail.kaptda_cnt = Some(116);
    detail.kapt_top_floor = Some(17);
    detail.kapt_bcompany = Some("쌍용건설".to_string());
    detail.kapt_usedate = Some("20040130".to_string());
    detail
}

enum Pages {
    /// Served exactly as given, page 1 first; pages past the end are empty.
    Fixed(Vec<Vec<ListRecord>>),
    /// Sliced by the requested page size, reporting the total count.
    Dataset(Vec<ListRecord>),
    /// The same page for every page number.
    Repeating(Vec<ListRecord>),
}

/// In-memory stand-in for the data portal.
pub struct FakePortal {
    pages: HashMap<String, Pages>,
    fail_list_page: Option<u32>,
    fail_detail_request: Option<usize>,
    mismatched_detail: Option<String>,
    list_requests: Mutex<Vec<(String, u32, u32)>>,
    detail_requests: Mutex<Vec<String>>,
}

impl FakePortal {
    pub fn new() -> FakePortal {
        FakePortal {
            pages: HashMap::new(),
            fail_list_page: None,
            fail_detail_request: None,
            mismatched_detail: None,
            list_requests: Mutex::new(Vec::new()),
            detail_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pages(mut self, region: &str, pages: Vec<Vec<ListRecord>>) -> FakePortal {
        self.pages.insert(region.to_string(), Pages::Fixed(pages));
        self
    }

    /// `count` complexes named `{prefix}1..{prefix}{count}` in `region`.
    pub fn with_dataset(mut self, region: &str, prefix: &str, count: usize) -> FakePortal {
        let records = (1..=count)
            .map(|n| list_record(&format!("{prefix}{n}"), region))
            .collect();
        self.pages.insert(region.to_string(), Pages::Dataset(records));
        self
    }

    /// Ignores `pageNo` and answers every request with `page`.
    pub fn with_repeating_page(mut self, region: &str, page: Vec<ListRecord>) -> FakePortal {
        self.pages.insert(region.to_string(), Pages::Repeating(page));
        self
    }

    /// Every request for page `page_no` is answered with an error status.
    pub fn failing_list_page(mut self, page_no: u32) -> FakePortal {
        self.fail_list_page = Some(page_no);
        self
    }

    /// The `k`-th detail request (1-based) times out.
    pub fn failing_detail_request(mut self, k: usize) -> FakePortal {
        self.fail_detail_request = Some(k);
        self
    }

    /// The detail response for `kapt_code` describes a different complex.
    pub fn mismatching_detail(mut self, kapt_code: &str) -> FakePortal {
        self.mismatched_detail = Some(kapt_code.to_string());
        self
    }

    pub fn list_requests(&self) -> Vec<(String, u32, u32)> {
        self.list_requests.lock().unwrap().clone()
    }

    pub fn detail_requests(&self) -> Vec<String> {
        self.detail_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AptSource for FakePortal {
    async fn fetch_list_page(
        &self,
        region: &Region,
        page_no: u32,
        page_size: u32,
    ) -> Result<ListPage> {
        self.list_requests
            .lock()
            .unwrap()
            .push((region.code().to_string(), page_no, page_size));

        if self.fail_list_page == Some(page_no) {
            return Err(CollectError::Api(
                "getSigunguAptList3 responded with 500 Internal Server Error".to_string(),
            ));
        }

        let page = match self.pages.get(region.code()) {
            None => ListPage {
                records: Vec::new(),
                total_count: None,
            },
            Some(Pages::Fixed(pages)) => ListPage {
                records: pages
                    .get(page_no as usize - 1)
                    .cloned()
                    .unwrap_or_default(),
                total_count: None,
            },
            Some(Pages::Repeating(records)) => ListPage {
                records: records.clone(),
                total_count: None,
            },
            Some(Pages::Dataset(records)) => {
                let start = ((page_no - 1) * page_size) as usize;
                let end = (start + page_size as usize).min(records.len());
                ListPage {
                    records: records.get(start..end).map(<[_]>::to_vec).unwrap_or_default(),
                    total_count: Some(records.len() as u64),
                }
            }
        };

        Ok(page)
    }

    async fn fetch_detail(&self, kapt_code: &str) -> Result<DetailRecord> {
        let request_no = {
            let mut requests = self.detail_requests.lock().unwrap();
            requests.push(kapt_code.to_string());
            requests.len()
        };

        if self.fail_detail_request == Some(request_no) {
            return Err(CollectError::TransientNetwork(format!(
                "operation timed out fetching {kapt_code}"
            )));
        }

        if self.mismatched_detail.as_deref() == Some(kapt_code) {
            return Ok(detail_record("someone-else"));
        }

        Ok(detail_record(kapt_code))
    }
}
