use super::{get_text, Adapter, ErrorPolicy};
use crate::model::RedditPost;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

const LISTING_LIMIT: usize = 25;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditParams {
    pub subreddit: String,
    pub sort: String,
}

impl RedditParams {
    pub fn hot(subreddit: &str) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            sort: "hot".into(),
        }
    }
}

#[derive(Default)]
pub struct RedditAdapter;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: RawPost,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPost {
    id: Option<String>,
    title: Option<String>,
    permalink: Option<String>,
    score: Option<i64>,
    num_comments: Option<u64>,
    created_utc: Option<f64>,
    author: Option<String>,
    selftext: Option<String>,
}

impl Adapter for RedditAdapter {
    type Params = RedditParams;
    type Output = Vec<RedditPost>;

    fn name(&self) -> &'static str {
        "reddit"
    }

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Fallback
    }

    fn fetch(&self, params: &RedditParams) -> Result<Vec<RedditPost>> {
        let url = format!(
            "https://www.reddit.com/r/{}/{}.json?limit={LISTING_LIMIT}",
            urlencoding::encode(&params.subreddit),
            urlencoding::encode(&params.sort),
        );
        let body = get_text(&url, "application/json")?;
        parse_listing(&body, &params.subreddit, chrono::Utc::now().timestamp())
    }

    fn fallback(&self, params: &RedditParams) -> Option<Vec<RedditPost>> {
        Some(sample_posts(&params.subreddit, chrono::Utc::now().timestamp()))
    }
}

pub(crate) fn parse_listing(body: &str, subreddit: &str, now: i64) -> Result<Vec<RedditPost>> {
    let listing: Listing = serde_json::from_str(body).context("parse reddit listing")?;
    Ok(listing
        .data
        .children
        .into_iter()
        .enumerate()
        .map(|(idx, child)| {
            let post = child.data;
            let content = post
                .selftext
                .map(|text| clean_text(&text))
                .filter(|text| !text.is_empty());
            RedditPost {
                id: post.id.unwrap_or_else(|| format!("reddit-{idx}")),
                title: post.title.unwrap_or_default(),
                url: format!(
                    "https://www.reddit.com{}",
                    post.permalink.unwrap_or_default()
                ),
                score: post.score.unwrap_or(0),
                num_comments: post.num_comments.unwrap_or(0),
                created: post.created_utc.map(|t| t as i64).unwrap_or(now),
                subreddit: format!("r/{subreddit}"),
                author: post.author.unwrap_or_default(),
                content,
            }
        })
        .collect())
}

fn clean_text(raw: &str) -> String {
    let stripped = HTML_TAG.replace_all(raw, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

fn sample_posts(subreddit: &str, now: i64) -> Vec<RedditPost> {
    let samples = [
        ("Best cheesesteak that isn't in South Philly?", 412, 238, 2),
        ("Kelly Drive loop is gorgeous this morning", 198, 31, 5),
        ("Regional rail delays again on the Manayunk/Norristown line", 87, 54, 9),
        ("Free outdoor movie night at the rec center this Friday", 156, 12, 20),
    ];
    samples
        .iter()
        .enumerate()
        .map(|(idx, (title, score, comments, hours_ago))| RedditPost {
            id: format!("sample-{subreddit}-{idx}"),
            title: title.to_string(),
            url: format!("https://www.reddit.com/r/{subreddit}/"),
            score: *score,
            num_comments: *comments,
            created: now - hours_ago * 3600,
            subreddit: format!("r/{subreddit}"),
            author: "sample".into(),
            content: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listing_children() {
        let body = r#"{"data":{"children":[
            {"data":{"id":"abc","title":"Hello","permalink":"/r/philadelphia/comments/abc/hello/","score":10,"num_comments":3,"created_utc":1700000000.0,"author":"me","selftext":"<p>Some   <b>text</b></p>"}},
            {"data":{"title":"No id"}}
        ]}}"#;
        let posts = parse_listing(body, "philadelphia", 42).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "abc");
        assert_eq!(
            posts[0].url,
            "https://www.reddit.com/r/philadelphia/comments/abc/hello/"
        );
        assert_eq!(posts[0].content.as_deref(), Some("Some text"));
        assert_eq!(posts[0].subreddit, "r/philadelphia");
        assert_eq!(posts[1].id, "reddit-1");
        assert_eq!(posts[1].created, 42);
        assert_eq!(posts[1].content, None);
    }

    #[test]
    fn malformed_listing_is_an_error() {
        assert!(parse_listing("{\"kind\":\"Listing\"}", "philly", 0).is_err());
    }

    #[test]
    fn fallback_is_never_empty() {
        let posts = RedditAdapter.fallback(&RedditParams::hot("philly")).unwrap();
        assert!(!posts.is_empty());
        assert!(posts.iter().all(|p| p.subreddit == "r/philly"));
    }
}
