use crate::error::TransportError;
use crate::models::{
    MediaStatus, MovieRequestSummary, RequestFilter, TvEpisodeSummary, TvRequestSummary,
};
use crate::overseerr::{OverseerrApi, RawRequest, SeasonDetail, TvDetail};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

const UNKNOWN_MOVIE_TITLE: &str = "Unknown Title";
const UNKNOWN_TV_TITLE: &str = "Unknown TV Show";

/// Cursor over the request-listing endpoint.
///
/// Pages are fetched strictly in order; the pager is done once the backend's
/// reported page count no longer exceeds the index of the page just fetched.
/// A transport failure is terminal: the caller is expected to drop anything
/// accumulated so far and surface the error as-is.
pub struct RequestPager<'a> {
    api: &'a dyn OverseerrApi,
    filter: Option<RequestFilter>,
    take: u32,
    skip: u32,
    done: bool,
}

impl<'a> RequestPager<'a> {
    pub fn new(api: &'a dyn OverseerrApi, filter: Option<RequestFilter>) -> Self {
        Self::with_page_size(api, filter, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(
        api: &'a dyn OverseerrApi,
        filter: Option<RequestFilter>,
        take: u32,
    ) -> Self {
        Self {
            api,
            filter,
            take: take.max(1),
            skip: 0,
            done: false,
        }
    }

    /// Fetches the next page, or `None` once the backend reports no further
    /// pages.
    pub async fn next_page(&mut self) -> Result<Option<Vec<RawRequest>>, TransportError> {
        if self.done {
            return Ok(None);
        }
        let page = match self.api.request_page(self.take, self.skip, self.filter).await {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };
        let current_page = self.skip / self.take + 1;
        if page.page_info.pages <= current_page {
            self.done = true;
        } else {
            self.skip += self.take;
        }
        debug!(
            "fetched request page {} of {} ({} items)",
            current_page,
            page.page_info.pages,
            page.results.len()
        );
        Ok(Some(page.results))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    /// A movie request: tmdbId is set and tvdbId is not.
    Movie { tmdb_id: i64 },
    /// A TV request: tvdbId marks it as TV, but tmdbId is what the detail
    /// and season endpoints key on.
    Tv { tmdb_id: i64 },
    /// Missing the identifiers either branch needs; dropped without error.
    Unclassified,
}

pub fn classify(request: &RawRequest) -> Classified {
    let Some(media) = request.media.as_ref() else {
        return Classified::Unclassified;
    };
    match (media.tmdb_id, media.tvdb_id) {
        (Some(tmdb_id), None) => Classified::Movie { tmdb_id },
        (Some(tmdb_id), Some(_)) => Classified::Tv { tmdb_id },
        _ => Classified::Unclassified,
    }
}

/// A request passes unless a start date is given and sorts after its
/// creation timestamp. Plain string comparison: ISO-8601 timestamps sort
/// lexicographically as long as both sides use the same precision.
fn passes_date_filter(start_date: Option<&str>, created_at: &str) -> bool {
    match start_date {
        Some(start) => start <= created_at,
        None => true,
    }
}

fn availability(request: &RawRequest) -> MediaStatus {
    let code = request
        .media
        .as_ref()
        .and_then(|m| m.status)
        .unwrap_or(1);
    MediaStatus::from_code(code)
}

/// Aggregates all movie requests matching the given filters into summaries.
///
/// A transport failure while paging aborts the whole call; a failed title
/// lookup only degrades that one entry to a placeholder.
pub async fn list_movie_requests(
    api: &dyn OverseerrApi,
    filter: Option<RequestFilter>,
    start_date: Option<&str>,
) -> Result<Vec<MovieRequestSummary>, TransportError> {
    let mut pager = RequestPager::new(api, filter);
    let mut summaries = Vec::new();

    while let Some(batch) = pager.next_page().await? {
        for request in batch {
            let Classified::Movie { tmdb_id } = classify(&request) else {
                continue;
            };
            if !passes_date_filter(start_date, &request.created_at) {
                continue;
            }
            let title = match api.movie_details(tmdb_id).await {
                Ok(detail) => detail.title.unwrap_or_else(|| UNKNOWN_MOVIE_TITLE.to_string()),
                Err(e) => {
                    warn!("movie lookup for tmdb id {} failed: {}", tmdb_id, e);
                    UNKNOWN_MOVIE_TITLE.to_string()
                }
            };
            summaries.push(MovieRequestSummary {
                title,
                media_availability: availability(&request),
                request_date: request.created_at,
            });
        }
    }
    Ok(summaries)
}

/// Aggregates all TV requests matching the given filters, one summary per
/// non-special season of each request.
///
/// Show and season lookups are memoized for the duration of the call, so
/// repeated requests for the same show do not hit the backend again. Nothing
/// is kept across calls.
pub async fn list_tv_requests(
    api: &dyn OverseerrApi,
    filter: Option<RequestFilter>,
    start_date: Option<&str>,
) -> Result<Vec<TvRequestSummary>, TransportError> {
    let mut pager = RequestPager::new(api, filter);
    let mut summaries = Vec::new();
    let mut shows: HashMap<i64, Option<TvDetail>> = HashMap::new();
    let mut seasons: HashMap<(i64, i64), SeasonDetail> = HashMap::new();

    while let Some(batch) = pager.next_page().await? {
        for request in batch {
            let Classified::Tv { tmdb_id } = classify(&request) else {
                continue;
            };
            if !passes_date_filter(start_date, &request.created_at) {
                continue;
            }

            let detail = match shows.get(&tmdb_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = match api.tv_details(tmdb_id).await {
                        Ok(detail) => Some(detail),
                        Err(e) => {
                            warn!("tv lookup for tmdb id {} failed: {}", tmdb_id, e);
                            None
                        }
                    };
                    shows.insert(tmdb_id, fetched.clone());
                    fetched
                }
            };
            // Without show details there is no season list to expand; this
            // request contributes nothing rather than aborting the call.
            let Some(detail) = detail else {
                continue;
            };

            let tv_title = detail
                .name
                .clone()
                .unwrap_or_else(|| UNKNOWN_TV_TITLE.to_string());
            let tv_title_availability = availability(&request);

            for season in &detail.seasons {
                // Season 0 holds specials and is never reported.
                if season.season_number == 0 {
                    continue;
                }
                let key = (tmdb_id, season.season_number);
                let season_detail = match seasons.get(&key) {
                    Some(cached) => cached.clone(),
                    None => {
                        let fetched = match api.season_details(tmdb_id, season.season_number).await
                        {
                            Ok(detail) => detail,
                            Err(e) => {
                                warn!(
                                    "season {} lookup for tmdb id {} failed: {}",
                                    season.season_number, tmdb_id, e
                                );
                                SeasonDetail { episodes: Vec::new() }
                            }
                        };
                        seasons.insert(key, fetched.clone());
                        fetched
                    }
                };

                let tv_episodes = season_detail
                    .episodes
                    .iter()
                    .map(|ep| TvEpisodeSummary {
                        episode_number: format!("{:02}", ep.episode_number),
                        episode_name: ep
                            .name
                            .clone()
                            .unwrap_or_else(|| format!("Episode {}", ep.episode_number)),
                    })
                    .collect();

                summaries.push(TvRequestSummary {
                    tv_title: tv_title.clone(),
                    tv_title_availability,
                    tv_season: format!("S{:02}", season.season_number),
                    tv_season_availability: tv_title_availability,
                    tv_episodes,
                    request_date: request.created_at.clone(),
                });
            }
        }
    }
    Ok(summaries)
}

/// TV requests the backend still considers unavailable.
pub async fn list_unavailable_tv_requests(
    api: &dyn OverseerrApi,
) -> Result<Vec<TvRequestSummary>, TransportError> {
    list_tv_requests(api, Some(RequestFilter::Unavailable), None).await
}

/// Human-readable availability report for the Overseerr server itself. A
/// reachable server reports a `version` field; anything else is rendered as
/// unavailable together with the failing URL.
pub async fn status_report(api: &dyn OverseerrApi) -> String {
    match api.server_status().await {
        Ok(data) => {
            let fields: Vec<String> = data
                .as_object()
                .map(|obj| obj.iter().map(|(k, v)| format!("- {}: {}", k, v)).collect())
                .unwrap_or_default();
            if data.get("version").is_some() {
                format!(
                    "Overseerr is available and these are the status data:\n{}",
                    fields.join("\n")
                )
            } else {
                format!(
                    "Overseerr responded but did not report a version:\n{}",
                    fields.join("\n")
                )
            }
        }
        Err(e) => format!(
            "Overseerr is not available and below is the request error:\n- url: {}\n- error: {}",
            e.url(),
            e
        ),
    }
}
