use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("url pattern"));

/// `https://{workspace}.slack.com/archives/{channel}/p{digits}`
static SLACK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://([^/]+)\.slack\.com/archives/([^/]+)/p(\d+)").expect("slack pattern")
});

/// `https://github.com/{owner}/{repo}/pull/{number}`
static GITHUB_PR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://github\.com/([^/]+)/([^/]+)/pull/(\d+)").expect("github pattern")
});

/// Service a URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlKind {
    Slack,
    GitHub,
    Jira,
    Unknown,
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UrlKind::Slack => "slack",
            UrlKind::GitHub => "github",
            UrlKind::Jira => "jira",
            UrlKind::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedUrl {
    pub url: String,
    pub kind: UrlKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessageRef {
    pub workspace: String,
    pub channel_id: String,
    /// Message timestamp in API form, `1234567890.123456`
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// What a preview fetcher would be asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PreviewRequest {
    Slack(SlackMessageRef),
    GitHub(PullRequestRef),
    Jira { url: String },
}

/// Every `http(s)://` run up to the next whitespace, in order
pub fn extract_urls(text: &str) -> Vec<&str> {
    URL_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}

pub fn detect_url_type(url: &str) -> UrlKind {
    if SLACK_REGEX.is_match(url) {
        UrlKind::Slack
    } else if GITHUB_PR_REGEX.is_match(url) {
        UrlKind::GitHub
    } else if url.contains("atlassian.net") || url.contains("jira") {
        UrlKind::Jira
    } else {
        UrlKind::Unknown
    }
}

pub fn detect_urls(text: &str) -> Vec<DetectedUrl> {
    extract_urls(text)
        .into_iter()
        .map(|url| DetectedUrl {
            url: url.to_string(),
            kind: detect_url_type(url),
        })
        .collect()
}

/// The `p`-prefixed digits carry the seconds in the first ten places.
pub fn parse_slack_url(url: &str) -> Option<SlackMessageRef> {
    let caps = SLACK_REGEX.captures(url)?;
    let raw = &caps[3];
    let split = raw.len().min(10);
    Some(SlackMessageRef {
        workspace: caps[1].to_string(),
        channel_id: caps[2].to_string(),
        timestamp: format!("{}.{}", &raw[..split], &raw[split..]),
    })
}

pub fn parse_github_pr_url(url: &str) -> Option<PullRequestRef> {
    let caps = GITHUB_PR_REGEX.captures(url)?;
    Some(PullRequestRef {
        owner: caps[1].to_string(),
        repo: caps[2].to_string(),
        number: caps[3].parse().ok()?,
    })
}

/// What to fetch for `url`, None for unrecognized links
pub fn preview_for(url: &str) -> Option<PreviewRequest> {
    match detect_url_type(url) {
        UrlKind::Slack => parse_slack_url(url).map(PreviewRequest::Slack),
        UrlKind::GitHub => parse_github_pr_url(url).map(PreviewRequest::GitHub),
        UrlKind::Jira => Some(PreviewRequest::Jira {
            url: url.to_string(),
        }),
        UrlKind::Unknown => None,
    }
}

/// Preview requests for every recognized URL in `text`
pub fn preview_requests(text: &str) -> Vec<PreviewRequest> {
    extract_urls(text).into_iter().filter_map(preview_for).collect()
}
