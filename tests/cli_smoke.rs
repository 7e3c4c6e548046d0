use std::path::PathBuf;

use kbdiagram::LayoutConfig;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_kbdiagram")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "kbdiagram.exe"
            } else {
                "kbdiagram"
            });
            p
        })
}

#[test]
fn cli_plan_writes_json_for_custom_config() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let cfg_path = dir.join("layout.json");
    let out_path = dir.join("plan.json");
    let _ = std::fs::remove_file(&out_path);

    let mut cfg = LayoutConfig::reference();
    cfg.cable.spiral_count = 4;
    let f = std::fs::File::create(&cfg_path).unwrap();
    serde_json::to_writer_pretty(f, &cfg).unwrap();

    let cfg_arg = cfg_path.to_string_lossy().to_string();
    let out_arg = out_path.to_string_lossy().to_string();

    let status = std::process::Command::new(exe())
        .args(["plan", "--config", cfg_arg.as_str(), "--out"])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    let plan = kbdiagram::from_json(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(plan.phases.len(), 30 + 5 + 4 + 9);
}

#[test]
fn cli_svg_writes_still() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let out_path = dir.join("still.svg");
    let _ = std::fs::remove_file(&out_path);
    let out_arg = out_path.to_string_lossy().to_string();

    let status = std::process::Command::new(exe())
        .args(["svg", "--at", "3.2", "--width", "640", "--out"])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    let svg = std::fs::read_to_string(&out_path).unwrap();
    assert!(svg.contains(r#"width="640""#));
}

#[test]
fn cli_rejects_invalid_config() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let cfg_path = dir.join("bad_layout.json");
    std::fs::write(&cfg_path, r#"{ "rows": 0 }"#).unwrap();
    let cfg_arg = cfg_path.to_string_lossy().to_string();

    let output = std::process::Command::new(exe())
        .args(["summary", "--config", cfg_arg.as_str()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("rows"));
}
