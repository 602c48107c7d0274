use std::env;

fn main() {
    // Load .env file during build for environment variables
    if let Err(e) = dotenvy::dotenv() {
        println!("cargo:warning=BUILD.RS: Failed to load .env file: {}. Using system environment variables.", e);
    }

    // Export environment variables to be available at runtime using cargo:rustc-env
    // These will be embedded in the binary at compile time
    if let Ok(api_key) = env::var("WRITEWISE_API_KEY") {
        println!("cargo:rustc-env=WRITEWISE_API_KEY={}", api_key);
        println!("cargo:warning=Embedded WRITEWISE_API_KEY (length: {})", api_key.len());
    }

    if let Ok(api_key) = env::var("OPENAI_API_KEY") {
        println!("cargo:rustc-env=OPENAI_API_KEY={}", api_key);
        println!("cargo:warning=Embedded OPENAI_API_KEY (length: {})", api_key.len());
    }

    if let Ok(base_url) = env::var("WRITEWISE_API_BASE_URL") {
        println!("cargo:rustc-env=WRITEWISE_API_BASE_URL={}", base_url);
    }

    if let Ok(model) = env::var("WRITEWISE_MODEL") {
        println!("cargo:rustc-env=WRITEWISE_MODEL={}", model);
    }

    tauri_build::build()
}
