#[test]
fn gen_man_outputs_troff() {
  test_support::init_tracing();
  let mut cmd = test_support::cmd_bin(test_support::BIN);
  let out = cmd.args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let text = String::from_utf8_lossy(&out.stdout);
  // clap_mangen emits a roff preamble before the title line
  assert!(
    text.lines().any(|l| l.starts_with(".TH ") && l.contains("dax")),
    "expected troff man header in {text}"
  );
  assert!(text.contains("thresholds"));
}
