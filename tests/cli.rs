use std::fs;
use std::process::Command;
use tempfile::tempdir;

const BIN: &str = env!("CARGO_BIN_EXE_stem-split");

#[test]
fn no_arguments_prints_usage_and_touches_nothing() {
    let tmp = tempdir().unwrap();
    let output = Command::new(BIN).current_dir(tmp.path()).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn one_argument_prints_usage_and_touches_nothing() {
    let tmp = tempdir().unwrap();
    let output = Command::new(BIN)
        .arg("track.mp3")
        .current_dir(tmp.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn missing_input_file_fails_without_output() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out");
    let output = Command::new(BIN)
        .arg(tmp.path().join("nope.mp3"))
        .arg(&out)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
    assert!(!out.exists());
}

#[cfg(unix)]
#[test]
fn prints_stem_mapping_as_one_json_line() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let input = tmp.path().join("track.mp3");
    fs::write(&input, b"mixed audio").unwrap();
    let out = tmp.path().join("out");

    // Stands in for demucs: receives `--mp3 -o <out> <input>` and leaves the
    // nested layout the real tool would.
    let stub = tmp.path().join("fake-demucs");
    fs::write(
        &stub,
        "#!/bin/sh\n\
         set -e\n\
         out=\"$3\"\n\
         mkdir -p \"$out/modelA/song1\"\n\
         for stem in vocals drums bass other; do\n\
         \x20 printf mp3 > \"$out/modelA/song1/$stem.mp3\"\n\
         done\n",
    )
    .unwrap();
    fs::set_permissions(&stub, fs::Permissions::from_mode(0o755)).unwrap();

    let output = Command::new(BIN)
        .arg(&input)
        .arg(&out)
        .env("STEMSERVE_DEMUCS_BIN", &stub)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1, "stdout: {stdout}");
    let json: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "bass": out.join("bass.mp3"),
            "drums": out.join("drums.mp3"),
            "other": out.join("other.mp3"),
            "vocals": out.join("vocals.mp3"),
        })
    );
    assert!(!out.join("modelA").exists());
}
