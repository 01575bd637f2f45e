use std::path::PathBuf;
use std::process::Command;
use test_case::test_case;

fn write_sheet(name: &str, css: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("cascara-{}-{name}", std::process::id()));
    std::fs::write(&path, css).unwrap();
    path
}

fn css_parser(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_css-parser"))
        .args(args)
        .output()
        .unwrap();
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn prints_events() {
    let path = write_sheet("events.css", "@media print {\n  p { color: #FFF }\n}\n");
    let (ok, stdout, _) = css_parser(&[path.to_str().unwrap()]);

    assert!(ok);
    assert!(stdout.contains("[StartMedia] print"));
    assert!(stdout.contains("    [Property] color: #fff"));
}

#[test]
fn prints_json() {
    let path = write_sheet("json.css", "a { b: c }");
    let (ok, stdout, _) = css_parser(&["--json", path.to_str().unwrap()]);

    assert!(ok);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(json.as_array().is_some_and(|events| !events.is_empty()));
}

#[test]
fn errors_fail_with_a_snippet() {
    let path = write_sheet("errors.css", "a { b: c }\nd > { e: f }\n");
    let (ok, _, stderr) = css_parser(&["--quiet", path.to_str().unwrap()]);

    assert!(!ok);
    assert!(stderr.contains(":2:5: error:"), "{stderr}");
    assert!(stderr.contains('^'));
}

#[test]
fn flags_enable_hacks() {
    let path = write_sheet("flags.css", "p { *zoom: 1; width: 10px\\9 }");

    let (ok, _, _) = css_parser(&["--quiet", path.to_str().unwrap()]);
    assert!(!ok);

    let (ok, stdout, stderr) = css_parser(&["--flags", "starhack,ievalues", path.to_str().unwrap()]);
    assert!(ok, "{stderr}");
    assert!(stdout.contains("*zoom"));
    assert!(stderr.contains("warning"));
}

#[test_case("nope" ; "unknown name")]
#[test_case("ievalues,,starhack" ; "empty name")]
#[test_case("ievalues;starhack" ; "wrong separator")]
fn rejects_bad_flags(flags: &str) {
    let path = write_sheet("bad-flags.css", "a { b: c }");
    let (ok, stdout, stderr) = css_parser(&["--flags", flags, path.to_str().unwrap()]);

    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(stderr.contains("flag"), "{stderr}");
}

#[test]
fn prints_tokens() {
    let path = write_sheet("tokens.css", "a{}");
    let (ok, stdout, _) = css_parser(&["--tokens", path.to_str().unwrap()]);

    assert!(ok);
    assert!(stdout.contains("LCurly"));
    assert!(stdout.contains("Eof"));
}
