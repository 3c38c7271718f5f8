//! Riot Games HTTP implementation of [`MatchStatusClient`].
//!
//! Only the handful of fields needed for a [`MatchDescriptor`] are decoded.

use super::MatchStatusClient;
use crate::error::ClientError;
use async_trait::async_trait;
use caster_types::{MatchDescriptor, ObserverCredentials, Participant, TeamSide, TrackedPlayer};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "X-Riot-Token";
const DEFAULT_OBSERVER_PORT: u16 = 80;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountDto {
    puuid: String,
    game_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentGameInfo {
    game_id: u64,
    platform_id: Option<String>,
    observers: ObserversDto,
    #[serde(default)]
    participants: Vec<ParticipantDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObserversDto {
    encryption_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantDto {
    puuid: Option<String>,
    team_id: u16,
    riot_id: Option<String>,
}

/// Client for the account-v1 and spectator-v5 endpoints.
#[derive(Debug, Clone)]
pub struct RiotClient {
    http: reqwest::Client,
    api_key: String,
    observer_host: Option<String>,
    observer_port: u16,
}

impl RiotClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key,
            observer_host: None,
            observer_port: DEFAULT_OBSERVER_PORT,
        })
    }

    /// Use a fixed observer endpoint instead of the per-region default.
    pub fn with_observer(mut self, host: Option<String>, port: u16) -> Self {
        self.observer_host = host;
        self.observer_port = port;
        self
    }

    fn observer_host_for(&self, region: &str) -> String {
        self.observer_host
            .clone()
            .unwrap_or_else(|| default_observer_host(region))
    }

    async fn get(&self, url: Url) -> Result<Option<reqwest::Response>, ClientError> {
        debug!(%url, "Riot API request");
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs);
                warn!(?retry_after, "Riot API rate limit hit");
                Err(ClientError::RateLimited { retry_after })
            }
            status if status.is_success() => Ok(Some(response)),
            status => Err(ClientError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[async_trait]
impl MatchStatusClient for RiotClient {
    async fn active_match(
        &self,
        player: &TrackedPlayer,
        region: &str,
    ) -> Result<Option<MatchDescriptor>, ClientError> {
        let url = api_url(
            &platform_host(region),
            &["lol", "spectator", "v5", "active-games", "by-summoner", player.id.as_str()],
        )?;

        let Some(response) = self.get(url).await? else {
            return Ok(None);
        };
        let info: CurrentGameInfo = response.json().await?;

        Ok(Some(into_descriptor(
            info,
            region,
            self.observer_host_for(region),
            self.observer_port,
        )))
    }

    async fn resolve_player(&self, name: &str, region: &str) -> Result<TrackedPlayer, ClientError> {
        let (game_name, tag_line) = split_riot_id(name, region);
        let url = api_url(
            &regional_host(region),
            &["riot", "account", "v1", "accounts", "by-riot-id", game_name, tag_line.as_str()],
        )?;

        let Some(response) = self.get(url).await? else {
            return Err(ClientError::PlayerNotFound(name.to_string()));
        };
        let account: AccountDto = response.json().await?;

        Ok(TrackedPlayer::new(
            account.puuid,
            account.game_name.unwrap_or_else(|| game_name.to_string()),
        ))
    }
}

fn api_url(host: &str, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = Url::parse(&format!("https://{host}"))
        .map_err(|e| ClientError::Other(format!("invalid API host {host}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Other(format!("invalid API host {host}")))?
        .clear()
        .extend(segments);
    Ok(url)
}

fn platform_host(region: &str) -> String {
    format!("{}.api.riotgames.com", region.to_lowercase())
}

/// Account lookups are served per continent rather than per platform.
fn regional_host(region: &str) -> String {
    let routing = match region.to_uppercase().as_str() {
        "NA1" | "BR1" | "LA1" | "LA2" => "americas",
        "KR" | "JP1" => "asia",
        "OC1" | "PH2" | "SG2" | "TH2" | "TW2" | "VN2" => "sea",
        _ => "europe",
    };
    format!("{routing}.api.riotgames.com")
}

fn default_observer_host(region: &str) -> String {
    format!("spectator-consumer.{}.lol.pvp.net", region.to_lowercase())
}

/// Split `GameName#TAG`; a bare name gets the region's default tag (`EUW1` -> `EUW`).
fn split_riot_id<'a>(name: &'a str, region: &str) -> (&'a str, String) {
    match name.split_once('#') {
        Some((game_name, tag)) => (game_name, tag.to_string()),
        None => (
            name,
            region.trim_end_matches(|c: char| c.is_ascii_digit()).to_string(),
        ),
    }
}

fn into_descriptor(
    info: CurrentGameInfo,
    region: &str,
    observer_host: String,
    observer_port: u16,
) -> MatchDescriptor {
    let mut blue_seat = 0u8;
    let mut red_seat = 0u8;

    let participants = info
        .participants
        .into_iter()
        .filter_map(|p| {
            let side = TeamSide::from_team_id(p.team_id)?;
            let counter = match side {
                TeamSide::Blue => &mut blue_seat,
                TeamSide::Red => &mut red_seat,
            };
            let seat = *counter;
            *counter += 1;

            let name = p
                .riot_id
                .as_deref()
                .map(|id| id.split('#').next().unwrap_or(id).to_string())
                .unwrap_or_default();

            Some(Participant {
                seat,
                side,
                player_id: p.puuid.unwrap_or_default(),
                name,
            })
        })
        .collect();

    MatchDescriptor {
        match_id: info.game_id,
        region: info.platform_id.unwrap_or_else(|| region.to_uppercase()),
        participants,
        credentials: ObserverCredentials {
            host: observer_host,
            port: observer_port,
            encryption_key: info.observers.encryption_key,
        },
    }
}
