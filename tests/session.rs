use std::fs;

use drunkard::config::{RunConfig, SaveConfig};
use drunkard::export::Variant;
use drunkard::{Dimension, Error, Mode, StepDistribution, run};

fn headless() -> RunConfig {
    RunConfig {
        steps: 25,
        walkers: 5,
        window: false,
        ..RunConfig::default()
    }
}

#[test]
fn saves_requested_images() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        dimension: Dimension::Two,
        distribution: StepDistribution::Gaussian { sigma: 0.5 },
        mode: Mode::Animate,
        save: Some(SaveConfig {
            dir: dir.path().to_owned(),
            variants: vec![Variant::Histogram],
            gif: true,
            ..SaveConfig::new("run")
        }),
        ..headless()
    };

    let report = run(&config).unwrap();
    assert_eq!(report.seed, 1);
    assert_eq!(
        report.files,
        vec![
            dir.path().join("plots2d/histogram/run.png"),
            dir.path().join("plots2d/animation/run.gif"),
        ]
    );
    for file in &report.files {
        assert!(fs::metadata(file).unwrap().len() > 0);
    }
}

#[test]
fn unseeded_runs_report_a_reusable_seed() {
    let report = run(&RunConfig {
        seed: None,
        ..headless()
    })
    .unwrap();

    let again = RunConfig {
        seed: Some(report.seed),
        ..headless()
    };
    assert_eq!(run(&again).unwrap().seed, report.seed);
}

#[test]
fn config_file_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.toml");
    fs::write(&path, "dimension = 0\n").unwrap();

    match RunConfig::load(&path) {
        Err(Error::Config { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected a config error, got {other:?}"),
    }
    assert!(matches!(
        RunConfig::load(dir.path().join("missing.toml")),
        Err(Error::Config { .. })
    ));
}

#[test]
fn config_file_round_trips_through_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.toml");
    fs::write(
        &path,
        format!(
            r#"
            dimension = 3
            steps = 12
            walkers = 3
            start = [1.0, 2.0, 3.0]
            window = false

            [distribution]
            kind = "diagonal"

            [save]
            name = "cube"
            dir = {:?}
            variants = ["base"]
            "#,
            dir.path().display().to_string()
        ),
    )
    .unwrap();

    let config = RunConfig::load(&path).unwrap();
    let report = run(&config).unwrap();
    assert_eq!(report.files, vec![dir.path().join("plots3d/base/cube.png")]);
}
