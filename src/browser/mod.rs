// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page API and the bookmark form widget

mod ajax;
mod bookmarks;
mod config;
mod form;
mod page;

pub use ajax::Ajax;
pub use bookmarks::{BookmarksWidget, SubmissionOutcome, WidgetConfig, BOOKMARKED};
pub use config::PageConfig;
pub use form::{Form, FormSnapshot};
pub use page::{Page, SubmitResult};
