// Integration tests for the on-disk snapshot source.
//
// The fixture files mirror the shape of the live FPL payloads, including
// records the decoder must skip.

use gameweek_core::{Availability, Position};
use gameweek_fpl::{DataSource, FetchError, SnapshotSource};

const FIXTURES: &str = "tests/fixtures";

fn fixture_source() -> SnapshotSource {
    SnapshotSource::new(
        format!("{FIXTURES}/bootstrap-static.json"),
        format!("{FIXTURES}/fixtures.json"),
    )
}

#[tokio::test]
async fn loads_players_and_skips_malformed() {
    let feed = fixture_source().fetch_players().await.unwrap();

    // 23 well-formed elements; the record with non-numeric minutes is dropped.
    assert_eq!(feed.players.len(), 23);
    assert!(feed.players.iter().all(|p| p.name != "Broken"));
    assert_eq!(feed.teams.len(), 4);

    let saka = feed.players.iter().find(|p| p.name == "Saka").unwrap();
    assert_eq!(saka.position, Position::Midfielder);
    assert_eq!(saka.cost_tenths, 100);
    assert!((saka.form - 8.0).abs() < f64::EPSILON);

    let wissa = feed.players.iter().find(|p| p.name == "Wissa").unwrap();
    assert_eq!(wissa.availability, Availability::Unavailable);

    let digne = feed.players.iter().find(|p| p.name == "Digne").unwrap();
    assert_eq!(digne.availability, Availability::Doubtful);
    assert_eq!(digne.chance_of_playing, Some(75));

    let arteta = feed.players.iter().find(|p| p.name == "Arteta").unwrap();
    assert_eq!(arteta.position, Position::Unknown);
}

#[tokio::test]
async fn loads_scheduled_fixtures_only() {
    let fixtures = fixture_source().fetch_fixtures().await.unwrap();

    // Six records, one without a round.
    assert_eq!(fixtures.len(), 5);
    assert_eq!(fixtures.iter().filter(|f| f.finished).count(), 2);
    assert!(fixtures.iter().all(|f| (1..=3).contains(&f.round)));
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let source = SnapshotSource::new(
        format!("{FIXTURES}/does-not-exist.json"),
        format!("{FIXTURES}/fixtures.json"),
    );
    let err = source.fetch_players().await.unwrap_err();
    match err {
        FetchError::Io { path, .. } => assert!(path.ends_with("does-not-exist.json")),
        other => panic!("expected Io error, got: {other}"),
    }
}

#[tokio::test]
async fn wrong_payload_is_a_json_error() {
    // Feeding the fixtures file as bootstrap: an array, not an object.
    let source = SnapshotSource::new(
        format!("{FIXTURES}/fixtures.json"),
        format!("{FIXTURES}/fixtures.json"),
    );
    let err = source.fetch_players().await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::Json {
            what: "bootstrap-static",
            ..
        }
    ));
}

#[test]
fn describe_names_both_files() {
    let d = fixture_source().describe();
    assert!(d.contains("bootstrap-static.json"));
    assert!(d.contains("fixtures.json"));
}
