use std::{sync::Arc, thread};

use board_core::{DemoBoard, DemoView};
use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use eframe::egui;
use kv_client::{HttpKvClient, KvStore, MemoryKv};
use shared::domain::{Demo, ReactionKind, ReactionTally};

/// Single-page board for demos, reactions and feedback.
#[derive(Debug, Parser)]
#[command(name = "board_gui", about = "DemoBoard desktop UI")]
struct Args {
    /// Base URL of the key-value store, e.g. http://127.0.0.1:8080.
    /// When omitted the app runs against a process-local in-memory store.
    #[arg(long)]
    server_url: Option<String>,
}

enum BackendCommand {
    ListDemos,
    CreateDemo { headline: String },
    SelectDemo { demo: Demo },
    AddReaction { kind: ReactionKind },
    SubmitFeedback { text: String },
}

enum UiEvent {
    DemosLoaded(Vec<Demo>),
    DemoCreated(Demo),
    DemoSelected(DemoView),
    ReactionRecorded(ReactionTally),
    FeedbackRecorded(Vec<String>),
    Info(String),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiErrorContext {
    BackendStartup,
    LoadDemos,
    CreateDemo,
    SelectDemo,
    Reaction,
    Feedback,
}

fn err_label(context: UiErrorContext) -> &'static str {
    match context {
        UiErrorContext::BackendStartup => "Backend startup",
        UiErrorContext::LoadDemos => "Loading demos",
        UiErrorContext::CreateDemo => "Creating demo",
        UiErrorContext::SelectDemo => "Selecting demo",
        UiErrorContext::Reaction => "Recording reaction",
        UiErrorContext::Feedback => "Submitting feedback",
    }
}

#[derive(Debug, Clone)]
struct UiError {
    context: UiErrorContext,
    message: String,
}

impl UiError {
    fn new(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    fn banner_text(&self) -> String {
        format!("{}: {}", err_label(self.context), self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BannerSeverity {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: BannerSeverity,
    message: String,
}

fn spawn_backend_thread(
    server_url: Option<String>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    UiErrorContext::BackendStartup,
                    format!("failed to build backend runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let store: Arc<dyn KvStore> = match &server_url {
                Some(url) => {
                    tracing::info!(url = %url, "connecting to remote key-value store");
                    Arc::new(HttpKvClient::new(url.clone()))
                }
                None => {
                    let _ = ui_tx.try_send(UiEvent::Info(
                        "No --server-url given; running against an in-memory store".to_string(),
                    ));
                    Arc::new(MemoryKv::new())
                }
            };
            let board = DemoBoard::new(store);

            while let Ok(cmd) = cmd_rx.recv() {
                let event = match cmd {
                    BackendCommand::ListDemos => match board.list_demos().await {
                        Ok(demos) => UiEvent::DemosLoaded(demos),
                        Err(err) => UiEvent::Error(UiError::new(
                            UiErrorContext::LoadDemos,
                            err.to_string(),
                        )),
                    },
                    BackendCommand::CreateDemo { headline } => {
                        match board.create_demo(&headline).await {
                            Ok(demo) => UiEvent::DemoCreated(demo),
                            Err(err) => UiEvent::Error(UiError::new(
                                UiErrorContext::CreateDemo,
                                err.to_string(),
                            )),
                        }
                    }
                    BackendCommand::SelectDemo { demo } => match board.select_demo(&demo).await {
                        Ok(view) => UiEvent::DemoSelected(view),
                        Err(err) => UiEvent::Error(UiError::new(
                            UiErrorContext::SelectDemo,
                            err.to_string(),
                        )),
                    },
                    BackendCommand::AddReaction { kind } => match board.add_reaction(kind).await {
                        Ok(tally) => UiEvent::ReactionRecorded(tally),
                        Err(err) => UiEvent::Error(UiError::new(
                            UiErrorContext::Reaction,
                            err.to_string(),
                        )),
                    },
                    BackendCommand::SubmitFeedback { text } => {
                        match board.submit_feedback(&text).await {
                            Ok(entries) => UiEvent::FeedbackRecorded(entries),
                            Err(err) => UiEvent::Error(UiError::new(
                                UiErrorContext::Feedback,
                                err.to_string(),
                            )),
                        }
                    }
                };
                let _ = ui_tx.try_send(event);
            }
        });
    });
}

fn queue_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    banner: &mut Option<StatusBanner>,
) {
    let cmd_name = match &cmd {
        BackendCommand::ListDemos => "list_demos",
        BackendCommand::CreateDemo { .. } => "create_demo",
        BackendCommand::SelectDemo { .. } => "select_demo",
        BackendCommand::AddReaction { .. } => "add_reaction",
        BackendCommand::SubmitFeedback { .. } => "submit_feedback",
    };
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
            *banner = Some(StatusBanner {
                severity: BannerSeverity::Error,
                message: "Command queue is full; please retry".to_string(),
            });
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, "backend worker is gone");
            *banner = Some(StatusBanner {
                severity: BannerSeverity::Error,
                message: "Backend worker unavailable; restart the app".to_string(),
            });
        }
    }
}

fn reaction_emoji(kind: ReactionKind) -> &'static str {
    match kind {
        ReactionKind::Smile => "🙂",
        ReactionKind::Meh => "😐",
        ReactionKind::Frown => "🙁",
    }
}

struct DemoBoardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    demos: Vec<Demo>,
    selected: Option<Demo>,
    reactions: ReactionTally,
    feedback: Vec<String>,
    // Draft buffers are UI-only state, deliberately separate from the
    // lists they feed.
    headline_draft: String,
    feedback_draft: String,
    banner: Option<StatusBanner>,
}

impl DemoBoardApp {
    fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            demos: Vec::new(),
            selected: None,
            reactions: ReactionTally::default(),
            feedback: Vec::new(),
            headline_draft: String::new(),
            feedback_draft: String::new(),
            banner: None,
        };
        // Initial mount fetch.
        queue_command(&app.cmd_tx, BackendCommand::ListDemos, &mut app.banner);
        app
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::DemosLoaded(demos) => {
                self.demos = demos;
            }
            UiEvent::DemoCreated(demo) => {
                self.demos.push(demo);
                self.headline_draft.clear();
            }
            UiEvent::DemoSelected(view) => {
                self.selected = Some(view.demo);
                self.reactions = view.reactions;
                self.feedback = view.feedback;
            }
            UiEvent::ReactionRecorded(tally) => {
                self.reactions = tally;
            }
            UiEvent::FeedbackRecorded(entries) => {
                self.feedback = entries;
                self.feedback_draft.clear();
            }
            UiEvent::Info(message) => {
                self.banner = Some(StatusBanner {
                    severity: BannerSeverity::Info,
                    message,
                });
            }
            UiEvent::Error(err) => {
                self.banner = Some(StatusBanner {
                    severity: BannerSeverity::Error,
                    message: err.banner_text(),
                });
            }
        }
    }

    fn submit_headline(&mut self) {
        let headline = self.headline_draft.clone();
        queue_command(
            &self.cmd_tx,
            BackendCommand::CreateDemo { headline },
            &mut self.banner,
        );
    }

    fn submit_feedback(&mut self) {
        let text = self.feedback_draft.clone();
        queue_command(
            &self.cmd_tx,
            BackendCommand::SubmitFeedback { text },
            &mut self.banner,
        );
    }

    fn render_banner(&mut self, ctx: &egui::Context) {
        let Some(banner) = self.banner.clone() else {
            return;
        };
        egui::TopBottomPanel::top("status_banner").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let color = match banner.severity {
                    BannerSeverity::Info => ui.visuals().weak_text_color(),
                    BannerSeverity::Error => ui.visuals().error_fg_color,
                };
                ui.colored_label(color, &banner.message);
                if ui.button("✕").clicked() {
                    self.banner = None;
                }
            });
        });
    }

    fn render_create_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("create_demo_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.headline_draft)
                        .hint_text("Enter demo headline")
                        .desired_width(ui.available_width() - 140.0),
                );
                let submit_shortcut =
                    response.has_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("➕ Create demo").clicked() || submit_shortcut {
                    self.submit_headline();
                }
            });
            ui.add_space(4.0);
        });
    }

    fn render_demo_list(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("demo_list_panel")
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.heading("Demos");
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let mut clicked = None;
                    for demo in &self.demos {
                        let is_selected =
                            self.selected.as_ref().map(|s| &s.id) == Some(&demo.id);
                        let label = if demo.headline.is_empty() {
                            demo.id.as_str()
                        } else {
                            demo.headline.as_str()
                        };
                        if ui.selectable_label(is_selected, label).clicked() {
                            clicked = Some(demo.clone());
                        }
                    }
                    if let Some(demo) = clicked {
                        queue_command(
                            &self.cmd_tx,
                            BackendCommand::SelectDemo { demo },
                            &mut self.banner,
                        );
                    }
                    if self.demos.is_empty() {
                        ui.weak("No demos yet.");
                    }
                });
            });
    }

    fn render_feedback_composer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("feedback_composer").show(ctx, |ui| {
            ui.add_space(4.0);
            let can_submit = self.selected.is_some();
            ui.add_enabled_ui(can_submit, |ui| {
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.feedback_draft)
                            .hint_text("Enter feedback")
                            .desired_width(ui.available_width() - 150.0),
                    );
                    let submit_shortcut =
                        response.has_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Submit feedback").clicked() || submit_shortcut {
                        self.submit_feedback();
                    }
                });
            });
            if !can_submit {
                ui.weak("Pick a demo to leave feedback.");
            }
            ui.add_space(4.0);
        });
    }

    fn render_selected_demo(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(selected) = self.selected.clone() else {
                ui.centered_and_justified(|ui| {
                    ui.weak("Select a demo to see reactions and feedback.");
                });
                return;
            };

            ui.add_space(4.0);
            ui.heading(if selected.headline.is_empty() {
                selected.id.as_str()
            } else {
                selected.headline.as_str()
            });
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                for kind in ReactionKind::ALL {
                    if ui.button(reaction_emoji(kind)).clicked() {
                        queue_command(
                            &self.cmd_tx,
                            BackendCommand::AddReaction { kind },
                            &mut self.banner,
                        );
                    }
                    ui.label(self.reactions.count(kind).to_string());
                    ui.add_space(8.0);
                }
            });

            ui.add_space(8.0);
            ui.separator();
            ui.label(format!("Feedback ({})", self.feedback.len()));
            egui::ScrollArea::vertical().show(ui, |ui| {
                for entry in &self.feedback {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(entry);
                    });
                }
                if self.feedback.is_empty() {
                    ui.weak("No feedback yet.");
                }
            });
        });
    }
}

impl eframe::App for DemoBoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.render_banner(ctx);
        self.render_create_bar(ctx);
        self.render_feedback_composer(ctx);
        self.render_demo_list(ctx);
        self.render_selected_demo(ctx);

        // Backend events arrive off-frame; poll for them.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    spawn_backend_thread(args.server_url, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("DemoBoard")
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "DemoBoard",
        options,
        Box::new(|_cc| Ok(Box::new(DemoBoardApp::new(cmd_tx, ui_rx)))),
    )
}
