pub const DEFAULT_TF_DATA_DIR: &str = ".terraform";
const PLAN_ARTIFACT_NAME: &str = "plan.tfout";

/// Returns the saved-plan file name that `terraform show` reads.
///
/// The default data dir (or none) keeps the plain `plan.tfout` name; any other
/// data dir prefixes it, e.g. `.terraform-prod.plan.tfout`.
pub fn plan_artifact_path(data_dir: Option<&str>) -> String {
    match data_dir.map(str::trim) {
        None | Some("") | Some(DEFAULT_TF_DATA_DIR) => PLAN_ARTIFACT_NAME.to_string(),
        Some(dir) => format!("{dir}.{PLAN_ARTIFACT_NAME}"),
    }
}
