//! Page-number pagination over counted result sets.
//!
//! The page number comes straight from the `page` query parameter and is never
//! rejected: anything that is not an integer selects the first page, an integer
//! outside `1..=num_pages` selects the last one.

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

impl Paginator {
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    /// An empty result set still has one (empty) page.
    pub fn num_pages(&self) -> i64 {
        if self.count == 0 {
            1
        } else {
            self.count / self.per_page + i64::from(self.count % self.per_page != 0)
        }
    }

    pub fn page_number(&self, raw: Option<&str>) -> i64 {
        let last = self.num_pages();

        match raw.and_then(|raw| raw.trim().parse::<i64>().ok()) {
            None => 1,
            Some(number) if number < 1 || number > last => last,
            Some(number) => number,
        }
    }

    pub fn window(&self, number: i64) -> Window {
        Window {
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }

    pub fn page<T>(&self, number: i64, object_list: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();

        Page {
            object_list,
            number,
            num_pages,
            count: self.count,
            has_next: number < num_pages,
            has_previous: number > 1,
            next_page_number: (number < num_pages).then_some(number + 1),
            previous_page_number: (number > 1).then_some(number - 1),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<i64>,
    pub previous_page_number: Option<i64>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}
