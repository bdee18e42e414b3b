use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};
use blogsink_core::{
    AuthToken, BlogStore, JsonFileStorage, PostDraft, PostPatch, ProfilePatch, RegisterRequest,
    SessionIssuer, SocialLoginRequest, SortMode, User, query, stats,
};
use clap::{Parser, Subcommand, ValueEnum};

mod logging;
mod session;
mod settings;

use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "blogsink", version, about = "Command-line front end for the BlogSink data layer")]
struct Cli {
    /// Data directory with the JSON collections (defaults to BLOGSINK_DATA_DIR or ./data).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Latest,
    Popular,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Latest => SortMode::Latest,
            SortArg::Popular => SortMode::Popular,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a new account and start a session.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in via a social provider (upserts the account).
    Social {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
    /// Drop the cached session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Edit the signed-in user's profile.
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// List all users (insertion order).
    Users,
    /// Delete a user and cascade their posts and comments (admin, or self).
    DeleteUser {
        #[arg(long)]
        id: i64,
    },
    /// Create a post (draft unless --publish).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        category: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        publish: bool,
    },
    /// Update a post's fields (author or admin).
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    /// Publish a draft with its final tag set (author or admin).
    Publish {
        #[arg(long)]
        id: i64,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Delete a post and its comments (author or admin).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Toggle a like on a post.
    Like {
        #[arg(long)]
        id: i64,
    },
    /// Read a post by id or slug (counts a view).
    Read {
        post: String,
    },
    /// Comment on a post.
    Comment {
        #[arg(long)]
        post: i64,
        #[arg(long)]
        content: String,
    },
    /// Reply to a top-level comment.
    Reply {
        #[arg(long)]
        comment: i64,
        #[arg(long)]
        content: String,
    },
    /// Edit one of your comments.
    EditComment {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        content: String,
    },
    /// Delete a comment and its replies (author or admin).
    DeleteComment {
        #[arg(long)]
        id: i64,
    },
    /// Toggle a like on a comment.
    LikeComment {
        #[arg(long)]
        id: i64,
    },
    /// Show the comment threads of a post.
    Comments {
        #[arg(long)]
        post: i64,
    },
    /// Browse published posts with search, category filter, and sorting.
    Feed {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value = "all")]
        category: String,
        #[arg(long, value_enum, default_value = "latest")]
        sort: SortArg,
    },
    /// List the categories currently in use.
    Categories,
    /// Platform-wide dashboard numbers.
    Stats,
    /// Per-author dashboard numbers (defaults to the signed-in user).
    AuthorStats {
        #[arg(long)]
        author: Option<i64>,
    },
    /// Populate an empty data directory with demo users and posts.
    Seed,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    logging::init_logging(&settings.log_level)?;

    let cli = Cli::parse();
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| PathBuf::from(&settings.data_dir));
    let storage = JsonFileStorage::new(&data_dir);
    let mut store = BlogStore::load_from(&storage).context("failed to load data directory")?;
    tracing::debug!(
        data_dir = %data_dir.display(),
        users = store.list_users().len(),
        posts = store.posts().len(),
        "loaded store"
    );
    let issuer = SessionIssuer::new(settings.session_ttl_seconds);

    match cli.command {
        Command::Register {
            email,
            password,
            name,
        } => {
            let user = store.register(RegisterRequest {
                email,
                password,
                name,
            })?;
            store.save_to(&storage)?;
            start_session(&issuer, user, "Registered")?;
        }
        Command::Login { email, password } => {
            let user = store.authenticate(&email, &password)?;
            start_session(&issuer, user, "Signed in")?;
        }
        Command::Social {
            provider,
            email,
            name,
        } => {
            let user = store.social_authenticate(SocialLoginRequest {
                provider,
                email,
                name,
            })?;
            store.save_to(&storage)?;
            start_session(&issuer, user, "Signed in")?;
        }
        Command::Logout => {
            session::clear_session().context("failed to clear session")?;
            println!("Signed out");
        }
        Command::Whoami => {
            let token = require_session()?;
            print_user(&token.user);
        }
        Command::Profile { name, bio, avatar } => {
            let token = require_session()?;
            let user = store.update_profile(token.user.id, ProfilePatch { name, bio, avatar })?;
            store.save_to(&storage)?;
            print_user(&user);
        }
        Command::Users => {
            for user in store.list_users() {
                println!("- [{}] {} <{}> ({:?})", user.id, user.name, user.email, user.role);
            }
        }
        Command::DeleteUser { id } => {
            let token = require_session()?;
            if token.user.id != id && !token.user.is_admin() {
                bail!("only admins may delete other users");
            }
            store.delete_user(id)?;
            store.save_to(&storage)?;
            println!("User deleted: id={id}");
            if token.user.id == id {
                session::clear_session().context("failed to clear session")?;
            }
        }
        Command::Create {
            title,
            content,
            category,
            tags,
            excerpt,
            image,
            publish,
        } => {
            let token = require_session()?;
            let post = store.create_post(
                token.user.id,
                PostDraft {
                    title,
                    content,
                    excerpt,
                    category,
                    tags,
                    image_url: image,
                    published: publish,
                },
            )?;
            store.save_to(&storage)?;
            print_post("Post created", &post);
        }
        Command::Update {
            id,
            title,
            content,
            category,
            tags,
            excerpt,
            image,
        } => {
            let token = require_session()?;
            require_post_access(&store, id, &token.user)?;
            let post = store.update_post(
                id,
                PostPatch {
                    title,
                    content,
                    excerpt,
                    category,
                    tags: if tags.is_empty() { None } else { Some(tags) },
                    image_url: image,
                },
            )?;
            store.save_to(&storage)?;
            print_post("Post updated", &post);
        }
        Command::Publish { id, tags } => {
            let token = require_session()?;
            require_post_access(&store, id, &token.user)?;
            let post = store.publish_post(id, tags)?;
            store.save_to(&storage)?;
            print_post("Post published", &post);
        }
        Command::Delete { id } => {
            let token = require_session()?;
            require_post_access(&store, id, &token.user)?;
            if store.delete_post(id) {
                store.save_to(&storage)?;
                println!("Post deleted: id={id}");
            } else {
                println!("No such post: id={id}");
            }
        }
        Command::Like { id } => {
            let token = require_session()?;
            let post = store.like_post(id, token.user.id)?;
            store.save_to(&storage)?;
            let state = if post.liked_by.contains(&token.user.id) {
                "liked"
            } else {
                "unliked"
            };
            println!("{state}: \"{}\" now has {} likes", post.title, post.likes());
        }
        Command::Read { post } => {
            let id = resolve_post(&store, &post)?;
            let post = store.record_view(id)?;
            store.save_to(&storage)?;
            print_post("Post", &post);
            println!("content:\n{}", post.content);
        }
        Command::Comment { post, content } => {
            let token = require_session()?;
            let comment = store.add_comment(post, token.user.id, &content)?;
            store.save_to(&storage)?;
            println!("Comment added: id={}", comment.id);
        }
        Command::Reply { comment, content } => {
            let token = require_session()?;
            let reply = store.add_reply(comment, token.user.id, &content)?;
            store.save_to(&storage)?;
            println!("Reply added: id={}", reply.id);
        }
        Command::EditComment { id, content } => {
            let token = require_session()?;
            store.edit_comment(id, &content, token.user.id)?;
            store.save_to(&storage)?;
            println!("Comment edited: id={id}");
        }
        Command::DeleteComment { id } => {
            let token = require_session()?;
            if store.delete_comment(id, token.user.id)? {
                store.save_to(&storage)?;
                println!("Comment deleted: id={id}");
            } else {
                println!("No such comment: id={id}");
            }
        }
        Command::LikeComment { id } => {
            let token = require_session()?;
            let comment = store.like_comment(id, token.user.id)?;
            store.save_to(&storage)?;
            println!("Comment now has {} likes", comment.likes());
        }
        Command::Comments { post } => {
            let threads = store.list_for_blog(post);
            if threads.is_empty() {
                println!("No comments yet");
            }
            for thread in threads {
                let edited = if thread.comment.is_edited { " (edited)" } else { "" };
                println!(
                    "[{}] {}{}: {}",
                    thread.comment.id, thread.comment.author_name, edited, thread.comment.content
                );
                for reply in thread.replies {
                    println!("    [{}] {}: {}", reply.id, reply.author_name, reply.content);
                }
            }
        }
        Command::Feed {
            query: q,
            category,
            sort,
        } => {
            let hits = query::search(store.posts(), &q, &category);
            let hits = query::sort(hits, sort.into());
            println!("Posts: {}", hits.len());
            for post in hits {
                println!(
                    "- [{}] {} ({}, {} likes, {} views, ~{} min)",
                    post.id,
                    post.title,
                    post.category,
                    post.likes(),
                    post.views,
                    post.read_time_minutes()
                );
            }
        }
        Command::Categories => {
            for category in query::categories(store.posts()) {
                println!("- {category}");
            }
        }
        Command::Stats => {
            let report = stats::platform_stats(&store);
            println!("posts: {} ({} published, {} drafts)",
                report.total_posts, report.published_count, report.draft_count);
            println!("users: {} ({} admins)", report.total_users, report.admin_count);
            println!("likes: {}", report.total_likes);
            println!("comments: {}", report.total_comments);
            println!("views: {}", report.total_views);
            println!(
                "avg likes per published post: {:.2}",
                report.avg_likes_per_published_post
            );
            if let Some(author) = report.top_author {
                println!("top author: {} (id={})", author.name, author.id);
            }
            if let Some(post) = report.most_liked_post {
                println!("most liked post: \"{}\" ({} likes)", post.title, post.likes());
            }
        }
        Command::AuthorStats { author } => {
            let author_id = match author {
                Some(id) => id,
                None => require_session()?.user.id,
            };
            let report = stats::author_stats(&store, author_id)?;
            println!("published posts: {}", report.published_count);
            println!("views: {}", report.total_views);
            println!("likes: {}", report.total_likes);
            println!("comments: {}", report.total_comments);
            if let Some(post) = report.top_post_by_views {
                println!("top post by views: \"{}\" ({} views)", post.title, post.views);
            }
        }
        Command::Seed => {
            seed(&mut store)?;
            store.save_to(&storage)?;
            println!("Seeded demo data; sign in with admin@blogsink.dev / blogsink-admin");
        }
    }

    Ok(())
}

fn start_session(issuer: &SessionIssuer, user: User, verb: &str) -> Result<()> {
    let token = issuer.issue(user);
    session::save_session(&token).context("failed to save session")?;
    println!("{verb} as {} (session expires {})", token.user.name, token.expires_at);
    Ok(())
}

fn require_session() -> Result<AuthToken> {
    match session::load_session().context("failed to read session")? {
        Some(token) => Ok(token),
        None => bail!("no valid session: run `blogsink login` or `blogsink register` first"),
    }
}

fn require_post_access(store: &BlogStore, post_id: i64, actor: &User) -> Result<()> {
    let post = store
        .get_post(post_id)
        .with_context(|| format!("no such post: id={post_id}"))?;
    if post.author_id != actor.id && !actor.is_admin() {
        bail!("only the author or an admin may modify this post");
    }
    Ok(())
}

fn resolve_post(store: &BlogStore, key: &str) -> Result<i64> {
    if let Ok(id) = key.parse::<i64>() {
        return Ok(id);
    }
    store
        .find_post_by_slug(key)
        .map(|post| post.id)
        .with_context(|| format!("no post with slug '{key}'"))
}

fn print_user(user: &User) {
    println!("id: {}", user.id);
    println!("name: {}", user.name);
    println!("email: {}", user.email);
    println!("role: {:?}", user.role);
    if !user.bio.is_empty() {
        println!("bio: {}", user.bio);
    }
    println!("joined: {}", user.created_at);
}

fn print_post(title: &str, post: &blogsink_core::Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("slug: {}", post.slug);
    println!("title: {}", post.title);
    println!("author: {} (id={})", post.author_name, post.author_id);
    println!("category: {}", post.category);
    if !post.tags.is_empty() {
        println!("tags: {}", post.tags.join(", "));
    }
    println!("excerpt: {}", post.excerpt);
    println!("published: {}", post.published);
    println!("likes: {}  views: {}", post.likes(), post.views);
    println!("created: {}  updated: {}", post.created_at, post.updated_at);
}

fn seed(store: &mut BlogStore) -> Result<()> {
    if !store.posts().is_empty() || !store.list_users().is_empty() {
        bail!("data directory is not empty; refusing to seed");
    }

    let admin = store.register(RegisterRequest {
        email: "admin@blogsink.dev".to_string(),
        password: "blogsink-admin".to_string(),
        name: "Site Admin".to_string(),
    })?;
    store.promote_to_admin(admin.id)?;
    let ada = store.register(RegisterRequest {
        email: "ada@blogsink.dev".to_string(),
        password: "blogsink-demo".to_string(),
        name: "Ada".to_string(),
    })?;
    let bob = store.register(RegisterRequest {
        email: "bob@blogsink.dev".to_string(),
        password: "blogsink-demo".to_string(),
        name: "Bob".to_string(),
    })?;

    let react = store.create_post(
        ada.id,
        PostDraft {
            title: "Getting Started with React and TypeScript".to_string(),
            content: "<p>Setting up a typed component tree from scratch.</p>".to_string(),
            excerpt: None,
            category: "Engineering".to_string(),
            tags: vec!["React".to_string(), "TypeScript".to_string(), "Web".to_string()],
            image_url: None,
            published: true,
        },
    )?;
    let design = store.create_post(
        bob.id,
        PostDraft {
            title: "Color Systems That Scale".to_string(),
            content: "<p>Tokens, palettes, and when to break the rules.</p>".to_string(),
            excerpt: None,
            category: "Design".to_string(),
            tags: vec!["Color".to_string(), "Tokens".to_string(), "UI".to_string()],
            image_url: None,
            published: true,
        },
    )?;
    store.create_post(
        ada.id,
        PostDraft {
            title: "Unfinished Thoughts on Testing".to_string(),
            content: "<p>Draft notes.</p>".to_string(),
            excerpt: None,
            category: "Engineering".to_string(),
            tags: vec![],
            image_url: None,
            published: false,
        },
    )?;

    store.like_post(react.id, bob.id)?;
    store.like_post(design.id, ada.id)?;
    let comment = store.add_comment(react.id, bob.id, "Great walkthrough!")?;
    store.add_reply(comment.id, ada.id, "Thanks!")?;
    store.record_view(react.id)?;
    store.record_view(react.id)?;
    store.record_view(design.id)?;
    Ok(())
}
