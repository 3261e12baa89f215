use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, CommentThread, FeedClient, FeedEvent, FeedSource, FollowToggle, LikeToggle,
    Settlement, ViewScope,
};
use shared::domain::{CommentId, FollowListKind, PostId, UserId};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides `api_base_url` from feed.toml / environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Feed {
        #[arg(long)]
        following: bool,
    },
    Like {
        post_id: i64,
    },
    Follow {
        post_id: i64,
    },
    Comments {
        post_id: i64,
    },
    Comment {
        post_id: i64,
        text: String,
    },
    DeleteComment {
        post_id: i64,
        comment_id: i64,
    },
    DeletePost {
        post_id: i64,
        #[arg(long)]
        following: bool,
    },
    Followers {
        user_id: i64,
    },
    Following {
        user_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.server_url {
        settings.api_base_url = url;
    }
    if let Some(token) = args.token {
        settings.token = Some(token);
    }

    let mut client = FeedClient::from_settings(&settings)?;
    if client.session().is_authenticated() {
        let me = client.load_current_user().await?;
        info!(user_id = me.id.0, "signed in as {}", me.display_name());
    } else {
        warn!("no token configured; mutations will be refused");
    }

    let mut events = client.subscribe_events();

    let page = ViewScope::new();
    match args.command {
        Command::Feed { following } => {
            for post in client.fetch_feed(feed_source(following)).await? {
                println!(
                    "#{} [{:?}] {} by {} ({} likes, {} comments)",
                    post.id,
                    post.category,
                    post.title,
                    post.author_name,
                    post.like_count(),
                    post.comment_count()
                );
            }
        }
        Command::Like { post_id } => {
            let post = client.fetch_post(PostId(post_id)).await?;
            let like = LikeToggle::new(client.view(page.child()), &post);
            let settlement = like.toggle().await?;
            let state = like.state();
            report(&settlement);
            println!("liked={} likes={}", state.liked, state.like_count);
        }
        Command::Follow { post_id } => {
            let post = client.fetch_post(PostId(post_id)).await?;
            let follow = FollowToggle::new(client.view(page.child()), &post);
            if !follow.is_available() {
                bail!("following {} is not available to this account", post.author_name);
            }
            let settlement = follow.toggle().await?;
            report(&settlement);
            println!("following={}", follow.state().following);
        }
        Command::Comments { post_id } => {
            let thread = client
                .open_comments(client.view(page.child()), PostId(post_id))
                .await?;
            print_thread(&thread);
        }
        Command::Comment { post_id, text } => {
            let thread = client
                .open_comments(client.view(page.child()), PostId(post_id))
                .await?;
            let created = thread.add(&text).await?;
            info!(comment_id = created.id.0, "comment posted");
            print_thread(&thread);
        }
        Command::DeleteComment {
            post_id,
            comment_id,
        } => {
            let thread = client
                .open_comments(client.view(page.child()), PostId(post_id))
                .await?;
            let settlement = thread.delete(CommentId(comment_id)).await?;
            report(&settlement);
            print_thread(&thread);
        }
        Command::DeletePost { post_id, following } => {
            let feed = client
                .open_feed(client.view(page.child()), feed_source(following))
                .await?;
            let settlement = feed.delete(PostId(post_id)).await?;
            report(&settlement);
            println!("{} posts left in the feed", feed.state().posts.len());
        }
        Command::Followers { user_id } => {
            print_follow_list(&client, UserId(user_id), FollowListKind::Followers).await?;
        }
        Command::Following { user_id } => {
            print_follow_list(&client, UserId(user_id), FollowListKind::Following).await?;
        }
    }
    page.close();
    drain_events(&mut events);

    Ok(())
}

/// Prints failure toasts raised while the command ran.
fn drain_events(events: &mut broadcast::Receiver<FeedEvent>) {
    loop {
        match events.try_recv() {
            Ok(FeedEvent::MutationFailed {
                message, detail, ..
            }) => eprintln!("{message} ({detail})"),
            Ok(FeedEvent::MutationConfirmed { .. }) => {}
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "missed feed events"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

fn feed_source(following: bool) -> FeedSource {
    if following {
        FeedSource::Following
    } else {
        FeedSource::All
    }
}

fn report(settlement: &Settlement) {
    match settlement {
        Settlement::Confirmed => println!("saved"),
        Settlement::Reverted(err) => println!("reverted: {err}"),
        Settlement::Skipped => println!("nothing to do"),
        Settlement::Dropped => println!("view closed before the server answered"),
    }
}

fn print_thread(thread: &CommentThread) {
    let state = thread.state();
    println!("{} comments on post #{}", state.comment_count, thread.post_id());
    for comment in state.comments {
        println!("  #{} {}: {}", comment.id, comment.author_name, comment.content);
    }
}

async fn print_follow_list(
    client: &FeedClient,
    user_id: UserId,
    kind: FollowListKind,
) -> Result<()> {
    let config = kind.config();
    let users = client.fetch_follow_list(user_id, kind).await?;
    println!("{}", config.title);
    if users.is_empty() {
        println!("  {}", config.empty_message);
    }
    for user in users {
        println!("  {} ({:?}) <{}>", user.display_name(), user.account_type, user.email);
    }
    Ok(())
}
