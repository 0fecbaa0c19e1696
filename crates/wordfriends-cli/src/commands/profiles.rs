use super::AppContext;
use anyhow::{Context, Result};
use wordfriends_core::profile::{EndpointProfile, ProfileRepository};

pub fn list(ctx: &AppContext) -> Result<()> {
    let store = ctx.profile_store();
    let current_id = store.get_current().map(|p| p.id).ok();

    for profile in store.list_all() {
        let marker = if current_id.as_deref() == Some(profile.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {:<28} {:<8} {} ({})",
            marker,
            profile.id,
            if profile.is_user_defined() { "user" } else { "built-in" },
            profile.name,
            profile.model
        );
    }
    Ok(())
}

pub fn current(ctx: &AppContext) -> Result<()> {
    let profile = ctx
        .profile_store()
        .get_current()
        .context("No profile is available")?;
    print_profile(&profile);
    Ok(())
}

pub fn use_profile(ctx: &AppContext, id: &str) -> Result<()> {
    let store = ctx.profile_store();
    if !store.list_all().iter().any(|p| p.id == id) {
        eprintln!("Warning: no profile '{id}' exists yet; the default profile is used until it does.");
    }
    store.set_current(id)?;
    println!("Current profile: {id}");
    Ok(())
}

pub fn add(ctx: &AppContext, name: &str, base_url: &str, model: &str, key: &str) -> Result<()> {
    let profile = ctx
        .profile_store()
        .create_user_profile(name, base_url, model, key)?;
    println!("Added profile {}", profile.id);
    Ok(())
}

pub fn remove(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.profile_store().delete_user_profile(id)?;
    println!("Removed profile {id}");
    Ok(())
}

pub fn reset(ctx: &AppContext) -> Result<()> {
    ctx.profile_store().reset_all()?;
    println!("All user profiles removed");
    Ok(())
}

fn print_profile(profile: &EndpointProfile) {
    println!("id:       {}", profile.id);
    println!("name:     {}", profile.name);
    println!("base url: {}", profile.base_url);
    println!("model:    {}", profile.model);
    println!(
        "api key:  {}",
        if profile.has_credential() { "set" } else { "missing" }
    );
    println!(
        "source:   {}",
        if profile.is_user_defined() { "user" } else { "built-in" }
    );
}
