use std::env;

fn main() {
    // Bake the fallback app host into the binary. Local builds get the public default.
    let app_host =
        env::var("LINKPRESS_DEFAULT_APP_HOST").unwrap_or_else(|_| "bsky.app".to_string());

    println!("cargo:rustc-env=LINKPRESS_DEFAULT_APP_HOST={}", app_host);
    println!("cargo:rerun-if-env-changed=LINKPRESS_DEFAULT_APP_HOST");
}
