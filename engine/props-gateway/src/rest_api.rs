//! REST API endpoints for the PropsGateway
//!
//! Every request re-reads the sheets it needs from the [`SheetStore`], so a
//! fresh export is picked up without a restart. Handlers never share mutable
//! state; each works on its own snapshot.

use crate::config::CorsConfig;
use crate::error::{ErrorResponse, GatewayError, GatewayResult};
use crate::props::{mlb_props, nba_props, unders_confidence, MlbLogs, NbaLogs};
use lineup_engine::{generate_from_config, LineupRequest, SanitizedLineup};
use prop_registry::store::{
    MLB_BATTERS_SHEET, MLB_PITCHERS_SHEET, NBA_LAST10_SHEET, NBA_LAST10_VS_OPP_SHEET,
};
use prop_registry::{PropSnapshot, SheetStore, Sport};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::Filter;

/// Largest accepted request body
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// NBA props with recent game logs
pub async fn get_nba_props(store: Arc<SheetStore>) -> Result<impl warp::Reply, warp::Rejection> {
    info!("/props endpoint hit");
    let props = load_nba_props(&store).await.map_err(reject("Error loading NBA props"))?;
    info!("{} NBA props served", props.len());
    Ok(warp::reply::json(&props))
}

async fn load_nba_props(store: &SheetStore) -> GatewayResult<Vec<crate::props::PropRecord>> {
    let picks = store.load_picks(Sport::Nba).await?;
    let logs = NbaLogs {
        last10: store.load_optional_sheet(Sport::Nba, NBA_LAST10_SHEET).await,
        last10_vs_opp: store.load_optional_sheet(Sport::Nba, NBA_LAST10_VS_OPP_SHEET).await,
    };
    Ok(nba_props(&picks, &logs))
}

/// MLB props with opposing pitcher info and recent game logs
pub async fn get_mlb_props(store: Arc<SheetStore>) -> Result<impl warp::Reply, warp::Rejection> {
    info!("/mlb-props endpoint hit");
    let props = load_mlb_props(&store).await.map_err(reject("Error loading MLB props"))?;
    info!("{} MLB props served", props.len());
    Ok(warp::reply::json(&props))
}

async fn load_mlb_props(store: &SheetStore) -> GatewayResult<Vec<crate::props::PropRecord>> {
    let picks = store.load_picks(Sport::Mlb).await?;
    let logs = MlbLogs {
        batters: store.load_optional_sheet(Sport::Mlb, MLB_BATTERS_SHEET).await,
        pitchers: store.load_optional_sheet(Sport::Mlb, MLB_PITCHERS_SHEET).await,
    };
    Ok(mlb_props(&picks, &logs))
}

/// Confidence spread of the NBA FADE/UNDER picks
pub async fn get_unders_confidence(
    store: Arc<SheetStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let picks = store
        .load_picks(Sport::Nba)
        .await
        .map_err(GatewayError::from)
        .map_err(reject("Error loading NBA props"))?;
    let spread = unders_confidence(&picks);
    info!("UNDERS confidence range: {:?} - {:?}", spread.min, spread.max);
    Ok(warp::reply::json(&spread))
}

/// Generate lineups from the picks of the requested sports
pub async fn post_generate_lineups(
    request: LineupRequest,
    store: Arc<SheetStore>,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!("/generate-lineups endpoint hit");
    let lineups =
        run_lineup_request(&request, &store).await.map_err(reject("Error generating lineups"))?;
    info!("{} lineups generated", lineups.len());
    Ok(warp::reply::json(&lineups))
}

async fn run_lineup_request(
    request: &LineupRequest,
    store: &SheetStore,
) -> GatewayResult<Vec<SanitizedLineup>> {
    if request.sports.is_empty() {
        return Err(GatewayError::BadRequest("No sports specified in request.".to_string()));
    }

    let mut snapshots = Vec::new();
    for sport in &request.sports {
        match Sport::parse(sport) {
            Some(sport) => snapshots.push(store.load_picks(sport).await?),
            None => warn!("Unsupported sport requested: {}", sport),
        }
    }

    if snapshots.is_empty() {
        return Err(GatewayError::BadRequest(
            "No valid data loaded for selected sports.".to_string(),
        ));
    }

    let snapshot = PropSnapshot::concat(snapshots);
    Ok(generate_from_config(request, &snapshot)?)
}

/// Log a failed request and turn its error into a rejection
fn reject(context: &'static str) -> impl Fn(GatewayError) -> warp::Rejection {
    move |err| {
        error!("{}: {}", context, err);
        warp::reject::custom(err)
    }
}

/// Turn rejections into JSON error payloads
pub async fn handle_rejection(rejection: warp::Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, response) = if let Some(err) = rejection.find::<GatewayError>() {
        (err.status_code(), err.to_response())
    } else if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, ErrorResponse::new("NOT_FOUND", "Route not found", None))
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, ErrorResponse::new("BAD_REQUEST", err.to_string(), None))
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorResponse::new("METHOD_NOT_ALLOWED", "Method not allowed", None),
        )
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorResponse::new("PAYLOAD_TOO_LARGE", "Request body too large", None),
        )
    } else {
        error!("Unhandled rejection: {:?}", rejection);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("INTERNAL_ERROR", "Internal server error", None),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&response), status))
}

/// Create REST API routes
pub fn create_routes(
    store: Arc<SheetStore>,
    cors: &CorsConfig,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let store_filter = warp::any().map(move || store.clone());

    // NBA props endpoint
    let nba = warp::path("props")
        .and(warp::path::end())
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(get_nba_props);

    // MLB props endpoint
    let mlb = warp::path("mlb-props")
        .and(warp::path::end())
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(get_mlb_props);

    // Under confidence endpoint
    let unders = warp::path("unders-confidence")
        .and(warp::path::end())
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(get_unders_confidence);

    // Lineup generation endpoint
    let lineups = warp::path("generate-lineups")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<LineupRequest>())
        .and(store_filter)
        .and_then(post_generate_lineups);

    // Health check endpoint
    let health = warp::path("health").and(warp::path::end()).and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    });

    // Combine all routes
    nba.or(mlb)
        .or(unders)
        .or(lineups)
        .or(health)
        .recover(handle_rejection)
        .with(
            warp::cors()
                .allow_origins(cors.allowed_origins.iter().map(String::as_str))
                .allow_credentials(true)
                .allow_headers(vec!["content-type"])
                .allow_methods(vec!["GET", "POST", "OPTIONS"]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::path::Path;

    const NBA_PICKS: &str = "\
Player,Team,Opponent,Sport,Tag,Home/Away,Confidence,Prop Type
LeBron James,LAL,BOS,NBA,SMASH,home,8.1,Points
Anthony Davis,LAL,BOS,NBA,GOOD,home,7.4,Rebounds
Jayson Tatum,BOS,LAL,NBA,MEGA SMASH,away,9.2,Points
Austin Reaves,LAL,BOS,NBA,FADE/UNDER,home,6.1,Assists
Jrue Holiday,BOS,LAL,NBA,FADE/UNDER,away,6.6,Assists
Derrick White,BOS,LAL,NBA,FADE/UNDER,away,6.3,Points
";

    struct Fixture {
        _nba: tempfile::TempDir,
        _mlb: tempfile::TempDir,
        store: Arc<SheetStore>,
    }

    fn fixture() -> Fixture {
        let nba = tempfile::tempdir().unwrap();
        let mlb = tempfile::tempdir().unwrap();
        write(nba.path(), "All_Picks.csv", NBA_PICKS);
        let store = Arc::new(SheetStore::new(nba.path(), mlb.path()));
        Fixture { _nba: nba, _mlb: mlb, store }
    }

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn body<B: AsRef<[u8]>>(response: &warp::http::Response<B>) -> Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let fixture = fixture();
        let routes = create_routes(fixture.store.clone(), &CorsConfig::default());

        let response = warp::test::request().method("GET").path("/health").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response)["status"], "healthy");
    }

    #[tokio::test]
    async fn test_props_endpoint() {
        let fixture = fixture();
        let routes = create_routes(fixture.store.clone(), &CorsConfig::default());

        let response = warp::test::request().method("GET").path("/props").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::OK);

        let props = body(&response);
        let props = props.as_array().unwrap();
        assert_eq!(props.len(), 6);
        assert_eq!(props[0]["Player"], "LeBron James");
        assert_eq!(props[0]["Confidence"], json!(8.1));
        assert_eq!(props[0]["Last10Stats"], json!([]));
    }

    #[tokio::test]
    async fn test_unders_confidence_endpoint() {
        let fixture = fixture();
        let routes = create_routes(fixture.store.clone(), &CorsConfig::default());

        let response =
            warp::test::request().method("GET").path("/unders-confidence").reply(&routes).await;
        let spread = body(&response);
        assert_eq!(spread["min"], json!(6.1));
        assert_eq!(spread["max"], json!(6.6));
    }

    #[tokio::test]
    async fn test_missing_mlb_sheet_is_server_error() {
        let fixture = fixture();
        let routes = create_routes(fixture.store.clone(), &CorsConfig::default());

        let response = warp::test::request().method("GET").path("/mlb-props").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(&response)["error"]["code"], "SHEET_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_generate_lineups() {
        let fixture = fixture();
        let routes = create_routes(fixture.store.clone(), &CorsConfig::default());

        let response = warp::test::request()
            .method("POST")
            .path("/generate-lineups")
            .json(&json!({
                "sports": ["NBA", "NHL"],
                "mixType": "3_OVER_3_UNDER",
                "maxLineups": 5,
                "seed": 7
            }))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        // Exactly one 3-over/3-under lineup exists in the fixture
        let lineups = body(&response);
        let lineups = lineups.as_array().unwrap();
        assert_eq!(lineups.len(), 1);
        assert_eq!(lineups[0].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_generate_lineups_requires_sports() {
        let fixture = fixture();
        let routes = create_routes(fixture.store.clone(), &CorsConfig::default());

        let response = warp::test::request()
            .method("POST")
            .path("/generate-lineups")
            .json(&json!({"mixType": "3_OVER_3_UNDER"}))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(&response)["error"]["message"], "No sports specified in request.");

        let response = warp::test::request()
            .method("POST")
            .path("/generate-lineups")
            .json(&json!({"sports": ["NHL"]}))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_lineups_rejects_unknown_mix() {
        let fixture = fixture();
        let routes = create_routes(fixture.store.clone(), &CorsConfig::default());

        let response = warp::test::request()
            .method("POST")
            .path("/generate-lineups")
            .json(&json!({"sports": ["nba"], "mixType": "bogus"}))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let message = body(&response)["error"]["message"].as_str().unwrap().to_string();
        assert!(message.contains("6_UNDER"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let fixture = fixture();
        let routes = create_routes(fixture.store.clone(), &CorsConfig::default());

        let response = warp::test::request().method("GET").path("/nope").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
