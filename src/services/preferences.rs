//! 上次使用的筛选条件
//!
//! 只为方便，读不出来就当没有

use crate::error::AppResult;
use crate::infrastructure::KeyValueStore;
use crate::models::StatusFilter;
use std::sync::Arc;

const LAST_FOLDER_KEY: &str = "lastFolderId";
const LAST_CURRICULUM_KEY: &str = "lastCurriculumId";
const LAST_STATUS_KEY: &str = "lastStatus";

/// 上次的选择
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastSelection {
    pub folder_id: Option<i64>,
    pub curriculum_id: Option<i64>,
    pub status: StatusFilter,
}

#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn last_selection(&self) -> LastSelection {
        LastSelection {
            folder_id: self.store.get(LAST_FOLDER_KEY).and_then(|v| v.parse().ok()),
            curriculum_id: self.store.get(LAST_CURRICULUM_KEY).and_then(|v| v.parse().ok()),
            status: self
                .store
                .get(LAST_STATUS_KEY)
                .and_then(|v| StatusFilter::parse(&v))
                .unwrap_or_default(),
        }
    }

    pub fn remember(&self, selection: &LastSelection) -> AppResult<()> {
        self.put(LAST_FOLDER_KEY, selection.folder_id)?;
        self.put(LAST_CURRICULUM_KEY, selection.curriculum_id)?;
        self.store.set(LAST_STATUS_KEY, selection.status.as_str())
    }

    fn put(&self, key: &str, value: Option<i64>) -> AppResult<()> {
        match value {
            Some(v) => self.store.set(key, &v.to_string()),
            None => self.store.remove(key),
        }
    }
}
