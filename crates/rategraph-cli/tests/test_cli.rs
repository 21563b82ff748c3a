use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RATINGS: &str = "1 a 5\n1 b 3\n2 a 5\n2 b 4\n3 b 3\n3 c 2\n4 c 2\n4 a 1\n";
const FRIENDSHIPS: &str = "1 2\n2 1\n3 4\n";

fn rategraph() -> Command {
    Command::cargo_bin("rategraph").unwrap()
}

fn dataset() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ratings.txt"), RATINGS).unwrap();
    fs::write(dir.path().join("friendships.txt"), FRIENDSHIPS).unwrap();
    dir
}

fn build(data: &Path, graph: &Path) {
    rategraph()
        .arg("build")
        .arg(data)
        .arg("-o")
        .arg(graph)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 users, 6 edges"));
}

#[test]
fn test_cli_build_and_stats() -> Result<(), Box<dyn std::error::Error>> {
    let data = dataset();
    for name in ["graph.bin", "graph.json"] {
        let graph = data.path().join(name);
        build(data.path(), &graph);

        rategraph()
            .arg("stats")
            .arg(&graph)
            .assert()
            .success()
            .stdout(predicate::str::contains("Users:          4"))
            .stdout(predicate::str::contains("Edges:          6"))
            .stdout(predicate::str::contains("Components:     1"));
    }
    Ok(())
}

#[test]
fn test_cli_influence_bands() -> Result<(), Box<dyn std::error::Error>> {
    let data = dataset();
    let graph = data.path().join("graph.bin");
    let cache = data.path().join("cache");
    build(data.path(), &graph);

    rategraph()
        .arg("influence")
        .arg(&graph)
        .args(["--band", "0:1", "--band", "0:0.1"])
        .arg("--cache-dir")
        .arg(&cache)
        .assert()
        .success()
        .stdout(predicate::str::contains("(4 users)"))
        .stdout(predicate::str::contains("undefined"));
    assert_eq!(fs::read_dir(&cache)?.count(), 1);

    rategraph()
        .arg("influence")
        .arg(&graph)
        .args(["--ranking", "consensus", "--tolerance", "within-one"])
        .assert()
        .success()
        .stdout(predicate::str::contains("consensus"));
    Ok(())
}

#[test]
fn test_cli_friends() -> Result<(), Box<dyn std::error::Error>> {
    let data = dataset();
    let graph = data.path().join("graph.bin");
    build(data.path(), &graph);

    rategraph()
        .arg("friends")
        .arg(&graph)
        .assert()
        .success()
        .stdout(predicate::str::contains("Friend influence: 0.666667"));
    Ok(())
}

#[test]
fn test_cli_sample_and_export() -> Result<(), Box<dyn std::error::Error>> {
    let data = dataset();
    let graph = data.path().join("graph.bin");
    let small = data.path().join("small.bin");
    let out = data.path().join("csv");
    build(data.path(), &graph);

    rategraph()
        .arg("sample")
        .arg(&graph)
        .args(["-n", "3", "--seed", "7", "-o"])
        .arg(&small)
        .assert()
        .success();

    rategraph()
        .arg("export")
        .arg(&small)
        .arg("--out-dir")
        .arg(&out)
        .arg("--weights")
        .assert()
        .success();

    let edges = fs::read_to_string(out.join("edges.csv"))?;
    assert!(edges.starts_with("Source,Target,Weight"));
    // three sampled users of a complete graph keep all three edges
    assert_eq!(edges.lines().count(), 4);
    assert!(fs::read_to_string(out.join("nodes.csv"))?.starts_with("ID\n"));
    Ok(())
}

#[test]
fn test_cli_sample_too_large() {
    let data = dataset();
    let graph = data.path().join("graph.bin");
    build(data.path(), &graph);

    rategraph()
        .arg("sample")
        .arg(&graph)
        .args(["-n", "4", "-o"])
        .arg(data.path().join("x.bin"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be smaller than the graph"));
}

#[test]
fn test_cli_malformed_rating() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ratings.txt"), "1 a 5\n2 a 9\n").unwrap();

    rategraph()
        .arg("build")
        .arg(dir.path())
        .arg("-o")
        .arg(dir.path().join("g.bin"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed rating"));
}

#[test]
fn test_cli_degrees() {
    let data = dataset();
    let graph = data.path().join("graph.bin");
    build(data.path(), &graph);

    rategraph()
        .arg("degrees")
        .arg(&graph)
        .assert()
        .success()
        .stdout(predicate::str::contains("     3 1.000000"))
        .stdout(predicate::str::contains("[0.9, 1.0] 4"));
}

#[test]
fn test_cli_friendship_graph_stats_and_degrees() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let friendships = dir.path().join("friendships.txt");
    fs::write(&friendships, "1 2\n2 1\n2 3\n3 1\n4 5\n")?;

    rategraph()
        .arg("stats")
        .arg(&friendships)
        .arg("--friendships")
        .assert()
        .success()
        .stdout(predicate::str::contains("Users:          5"))
        .stdout(predicate::str::contains("Edges:          4"))
        .stdout(predicate::str::contains("Components:     2"))
        .stdout(predicate::str::contains("Avg clustering: 0.6000"));

    rategraph()
        .arg("degrees")
        .arg(&friendships)
        .arg("--friendships")
        .assert()
        .success()
        .stdout(predicate::str::contains("     2 0.600000"))
        .stdout(predicate::str::contains("     1 0.400000"))
        .stdout(predicate::str::contains("[0.0, 0.1) 2"))
        .stdout(predicate::str::contains("[0.9, 1.0] 3"));
    Ok(())
}

#[test]
fn test_cli_generate_then_build() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let data = dir.path().join("random");

    rategraph()
        .arg("generate")
        .arg("--out-dir")
        .arg(&data)
        .args(["--seed", "3", "--users", "40", "--venues", "10", "--ratings-count", "150"])
        .args(["--friendship-probability", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 150 ratings"));

    for name in ["ratings.txt", "friendships.txt", "users.txt"] {
        assert!(data.join(name).exists(), "{name}");
    }

    rategraph()
        .arg("build")
        .arg(&data)
        .arg("-o")
        .arg(dir.path().join("g.bin"))
        .arg("--geo")
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_cli_null_model() {
    rategraph()
        .arg("null-model")
        .args(["--samples", "2", "--seed", "5"])
        .args(["--users", "30", "--venues", "8", "--ratings-count", "120"])
        .args(["--friendship-probability", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Null model (2 samples)"))
        .stdout(predicate::str::contains("Average degree:"));
}

#[test]
fn test_cli_clean() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let users = dir.path().join("users.dat");
    let venues = dir.path().join("venues.dat");
    let ratings = dir.path().join("ratings.dat");
    let checkins = dir.path().join("checkins.dat");
    fs::write(
        &users,
        " id | latitude | longitude\n----+---+---\n 1 | 37.77 | -122.42\n 3 | 51.05 | -114.07\n",
    )?;
    fs::write(
        &venues,
        " id | latitude | longitude\n----+---+---\n 10 | 37.78 | -122.41\n",
    )?;
    fs::write(
        &ratings,
        " user_id | venue_id | rating\n---+---+---\n 1 | 10 | 5\n 3 | 10 | 1\n",
    )?;
    fs::write(
        &checkins,
        concat!(
            " id | user_id | venue_id | latitude | longitude | created_at\n---\n",
            " 7 | 1 | 10 | 37.78 | -122.41 | 2011-05-01 10:00:00\n",
            " 8 | 3 | 10 | 37.78 | -122.41 | 2011-05-02 11:00:00\n",
        ),
    )?;
    let out = dir.path().join("clean");

    rategraph()
        .arg("clean")
        .arg("--users")
        .arg(&users)
        .arg("--venues")
        .arg(&venues)
        .arg("--ratings")
        .arg(&ratings)
        .arg("--checkins")
        .arg(&checkins)
        .args([
            "--polygon",
            concat!(
                "-122.553454,37.812965;-122.359602,37.817252;",
                "-122.346337,37.708571;-122.523607,37.708332",
            ),
        ])
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("users:    1 of 2"))
        .stdout(predicate::str::contains("checkins: 1 of 2"));

    assert_eq!(fs::read_to_string(out.join("ratings.txt"))?, "1 10 5\n");
    assert_eq!(
        fs::read_to_string(out.join("checkins.txt"))?,
        "7 1 10 37.78 -122.41 2011-05-01 10:00:00\n"
    );
    assert_eq!(fs::read_to_string(out.join("users.txt"))?, "1 37.77 -122.42\n");
    Ok(())
}
