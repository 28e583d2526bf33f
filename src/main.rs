// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! bookmarks-widget CLI
//!
//! Drives a bookmark form on a live page, or shows which requests a page
//! would attach its CSRF token to.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use bookmarks_widget::{
    CsrfHeaderInjector, DocumentOrigin, Page, PageConfig, SubmissionOutcome, SubmitResult, BOOKMARKED,
};
use reqwest::Method;
use url::Url;

/// Exit code when a bookmark submission failed
const EXIT_SUBMISSION_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bookmarks_widget=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "submit" => {
            if args.len() < 3 {
                eprintln!("Usage: bookmarks-widget submit <url> [selector] [--network-log]");
                return ExitCode::from(1);
            }
            let network_log = args[3..].iter().any(|a| a == "--network-log");
            let selector = args[3..]
                .iter()
                .find(|a| !a.starts_with("--"))
                .map(String::as_str)
                .unwrap_or(".bookmarks_form");
            submit(&args[2], selector, network_log).await
        }
        "check" => {
            if args.len() < 5 {
                eprintln!("Usage: bookmarks-widget check <page-url> <method> <target> [cookies]");
                return ExitCode::from(1);
            }
            let cookies = args.get(5).cloned().unwrap_or_default();
            check(&args[2], &args[3], &args[4], cookies)
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(ExitCode::SUCCESS)
        }
        "--version" | "-v" | "version" => {
            println!("bookmarks-widget {}", bookmarks_widget::VERSION);
            Ok(ExitCode::SUCCESS)
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Ok(ExitCode::from(1))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r##"bookmarks-widget - Headless client for Django bookmark forms

USAGE:
    bookmarks-widget <COMMAND> [OPTIONS]

COMMANDS:
    submit <url> [selector] [--network-log]      Load a page and submit a bookmark form
    check <page-url> <method> <target> [cookies] Show the CSRF header a request would get
    help                                         Show this help message
    version                                      Show version information

EXAMPLES:
    bookmarks-widget submit https://example.com/articles/42/
    bookmarks-widget submit https://example.com/articles/42/ "#fav.bookmarks_form"
    bookmarks-widget submit https://example.com/articles/42/ --network-log
    bookmarks-widget check https://example.com/a/ POST /bookmarks/add/ "csrftoken=abc"

Logging is controlled with RUST_LOG (default: bookmarks_widget=info).
Exit codes: 0 success, 1 error, 2 submission failed.
"##
    );
}

async fn submit(url: &str, selector: &str, network_log: bool) -> Result<ExitCode> {
    let page = Page::new(PageConfig::default()).context("failed to create page")?;
    page.navigate(url)
        .await
        .with_context(|| format!("failed to load {}", url))?;

    let doc = page.document().context("page did not return HTML")?;
    println!("Page: {} ({})", doc.title(), url);
    println!("Bookmark forms: {}", doc.query_selector_all(".bookmarks_form").len());

    doc.on(BOOKMARKED, ".bookmarks_form", |event, _| {
        if let Some(ref payload) = event.detail {
            println!("Event '{}' fired with payload: {}", BOOKMARKED, payload);
        }
    })?;

    match page.submit(selector).await? {
        SubmitResult::Submitted(response) => {
            println!("Submitted natively: {} {}", response.status, response.url);
            return Ok(ExitCode::SUCCESS);
        }
        SubmitResult::Intercepted => println!("Submission intercepted, posting in background"),
    }

    let outcomes = page.wait_for_idle().await?;
    let mut failed = false;
    for outcome in &outcomes {
        match outcome {
            SubmissionOutcome::Succeeded { action, status, .. } => {
                println!("OK    {} {}", status, action);
            }
            SubmissionOutcome::Failed { action, reason, .. } => {
                failed = true;
                let action = action.as_ref().map(Url::as_str).unwrap_or("-");
                println!("FAIL  {} {}", action, reason);
            }
        }
    }

    for event in page.network().events() {
        if let Some(token) = event.request_header("x-csrftoken") {
            println!("  {} {} sent X-CSRFToken: {}", event.request.method, event.request.url, token);
        }
    }

    if network_log {
        let log = page.network().to_json().context("failed to export network log")?;
        println!("{}", log);
    }

    if failed {
        Ok(ExitCode::from(EXIT_SUBMISSION_FAILED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn check(page_url: &str, method: &str, target: &str, cookies: String) -> Result<ExitCode> {
    let url = Url::parse(page_url).with_context(|| format!("invalid page URL '{}'", page_url))?;
    let method = Method::from_bytes(method.as_bytes())
        .with_context(|| format!("invalid method '{}'", method))?;

    let injector = CsrfHeaderInjector::new(Arc::new(cookies), DocumentOrigin::from_url(&url));
    match injector.token_for(&method, target) {
        Some(token) => println!("{}: {}", injector.config().header_name, token),
        None => println!("no {} header", injector.config().header_name),
    }

    Ok(ExitCode::SUCCESS)
}
