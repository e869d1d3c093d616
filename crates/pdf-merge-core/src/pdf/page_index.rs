//! Zero-based page index, checked against a document's page count.
//!
//! MuPDF addresses pages with `i32`; Rust collections and page counts use
//! `usize`. The conversion lives here so rendering code never casts.

use std::fmt;

use crate::error::Error;

/// A page index that can be safely handed to mupdf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageIndex(i32);

impl PageIndex {
    /// First page of any non-empty document.
    pub const FIRST: Self = Self(0);

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Index as usize for Rust collections.
    #[must_use]
    #[allow(clippy::cast_sign_loss)] // never negative by construction
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Try to create a PageIndex for `page_num` in a document of `total_pages`.
    pub fn try_from_page_num(page_num: usize, total_pages: usize) -> Result<Self, Error> {
        if page_num >= total_pages {
            return Err(Error::PdfInvalidPage {
                page: page_num,
                total: total_pages,
            });
        }

        let index = i32::try_from(page_num).map_err(|_| Error::PdfInvalidPage {
            page: page_num,
            total: total_pages,
        })?;

        Ok(Self(index))
    }
}

impl From<PageIndex> for i32 {
    fn from(index: PageIndex) -> Self {
        index.0
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
