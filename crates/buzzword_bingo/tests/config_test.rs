//! Settings files, vocabularies and their validation together.

use buzzword_bingo::{ClaimPolicy, FileWordSource, GameSettings, WordSource};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_settings_file_and_vocabulary_validate() {
    let dir = tempfile::tempdir().expect("temp dir");
    let words_path = dir.path().join("words.txt");
    std::fs::write(&words_path, "alpha\nbeta\ngamma\ndelta\n").expect("write words");

    let mut config = tempfile::NamedTempFile::new().expect("config file");
    writeln!(
        config,
        "player_count = 3\ncard_size = 2\nwords_file = {:?}\n\
         countdown_secs = 5\nclaim_policy = \"trust\"",
        words_path.display().to_string()
    )
    .expect("write config");

    let settings = GameSettings::from_file(config.path()).expect("settings load");
    let vocabulary = FileWordSource::new(settings.words_file())
        .load_vocabulary()
        .expect("words load");
    assert!(settings.validate(vocabulary.len()).is_ok());
    assert_eq!(*settings.claim_policy(), ClaimPolicy::Trust);
    assert_eq!(*settings.timing().countdown(), Duration::from_secs(5));

    let too_big = settings.with_card_size(3);
    assert!(too_big.validate(vocabulary.len()).is_err());
}

#[test]
fn test_missing_settings_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = GameSettings::load_or_default(dir.path().join("absent.toml")).expect("defaults");
    assert_eq!(settings, GameSettings::default());
}

#[test]
fn test_every_launch_gets_distinct_identity() {
    let settings = GameSettings::default()
        .with_player_count(3)
        .with_player_names(vec!["Ada".into(), "Bo".into(), "Cy".into()]);
    let launches = settings.player_launches();
    let names: Vec<_> = launches.iter().map(|l| l.player_name().as_str()).collect();
    assert_eq!(names, ["Ada", "Bo", "Cy"]);
    let ids: Vec<_> = launches.iter().map(|l| l.player_id().index()).collect();
    assert_eq!(ids, [0, 1, 2]);
}
