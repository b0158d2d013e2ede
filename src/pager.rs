use std::ops::Range;

use crate::{engine::CoreError, models::DisplayMode};

/// Page arithmetic over a working sequence of `len` records. Pages are 1-based.
///
/// In infinite mode the shown window is pages `1..=page` concatenated; `advance` hands out
/// only the newly reached page so the consumer can append it.
#[derive(Debug, Clone)]
pub struct Pager {
  page_size: usize,
  page: usize,
  mode: DisplayMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpan {
  pub page: usize,
  pub total_pages: usize,
  pub range: Range<usize>,
  pub append: bool,
}

impl PageSpan {
  pub fn has_more(&self) -> bool {
    self.page < self.total_pages
  }
}

impl Pager {
  pub fn new(page_size: usize, mode: DisplayMode) -> Result<Self, CoreError> {
    check_page_size(page_size)?;
    Ok(Self {
      page_size,
      page: 1,
      mode,
    })
  }

  pub fn page(&self) -> usize {
    self.page
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  pub fn mode(&self) -> DisplayMode {
    self.mode
  }

  pub fn total_pages(&self, len: usize) -> usize {
    len.div_ceil(self.page_size).max(1)
  }

  /// Records of page `page` alone, clamped to `len`.
  pub fn page_range(&self, len: usize, page: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(self.page_size).min(len);
    let end = start.saturating_add(self.page_size).min(len);
    start..end
  }

  /// Back to page 1; in infinite mode this also drops the accumulated window.
  pub fn reset(&mut self) {
    self.page = 1;
  }

  pub fn set_page_size(&mut self, page_size: usize) -> Result<(), CoreError> {
    check_page_size(page_size)?;
    self.page_size = page_size;
    self.reset();
    Ok(())
  }

  pub fn set_mode(&mut self, mode: DisplayMode) {
    self.mode = mode;
    self.reset();
  }

  /// What should be on screen right now.
  pub fn current(&self, len: usize) -> PageSpan {
    self.span_for(len, self.page)
  }

  /// Jump to `page`. Out-of-range pages are rejected and leave the pager untouched.
  pub fn go_to(&mut self, len: usize, page: usize) -> Result<PageSpan, CoreError> {
    let total_pages = self.total_pages(len);
    if page == 0 || page > total_pages {
      return Err(CoreError::PageOutOfRange { page, total_pages });
    }
    self.page = page;
    Ok(self.span_for(len, page))
  }

  /// Move one page forward. `None` once the last page is reached.
  pub fn advance(&mut self, len: usize) -> Option<PageSpan> {
    if self.page >= self.total_pages(len) {
      return None;
    }
    self.page += 1;
    let append = self.mode == DisplayMode::Infinite;
    Some(PageSpan {
      page: self.page,
      total_pages: self.total_pages(len),
      range: self.page_range(len, self.page),
      append,
    })
  }

  fn span_for(&self, len: usize, page: usize) -> PageSpan {
    let range = match self.mode {
      DisplayMode::Windowed => self.page_range(len, page),
      DisplayMode::Infinite => 0..self.page_range(len, page).end,
    };
    PageSpan {
      page,
      total_pages: self.total_pages(len),
      range,
      append: false,
    }
  }
}

fn check_page_size(page_size: usize) -> Result<(), CoreError> {
  if page_size == 0 {
    return Err(CoreError::InvalidArg("page size must be at least 1".into()));
  }
  Ok(())
}
