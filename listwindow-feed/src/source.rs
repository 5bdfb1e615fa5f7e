use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;

use crate::FetchError;

/// An item with a stable identity. The feed never looks at anything else.
pub trait Identified {
    type Id: Hash + Eq + Clone + Debug;

    fn id(&self) -> Self::Id;
}

/// One page of results as returned by a [`PageSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T> {
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> From<Vec<T>> for Page<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

/// Fetches page `page` (1-based) of the results for `subject`.
///
/// Implementations classify every failure into a [`FetchError`]; raw transport errors must not
/// escape.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Identified + Send;

    async fn fetch_page(
        &self,
        subject: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Self::Item>, FetchError>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for Arc<S> {
    type Item = S::Item;

    async fn fetch_page(
        &self,
        subject: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Self::Item>, FetchError> {
        (**self).fetch_page(subject, page, page_size).await
    }
}
