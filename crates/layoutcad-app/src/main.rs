//! LayoutCAD 无界面宿主
//!
//! 读取配置、可选的设施载荷和输入脚本，把脚本逐步回放给 [`Editor`]，
//! 最后保存几何载荷。
//!
//! ```text
//! layoutcad <script.json> [-i input] [-o output] [-c config.json]
//! ```
//!
//! 输出路径省略时把载荷 JSON 打印到标准输出。

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use layoutcad_core::error::GeometryError;
use layoutcad_core::geometry::{FacilityInfo, ZonePurpose};
use layoutcad_core::math::Point2;
use layoutcad_file::native;
use layoutcad_ui::{
    DrawingMode, Editor, EditorConfig, Key, Modifiers, PointerButton, PointerEvent,
    SelectionPatch,
};

/// 输入脚本
#[derive(Debug, Deserialize)]
struct Script {
    /// 设施信息，省略时保留载荷或默认值
    #[serde(default)]
    facility: Option<FacilityInfo>,
    steps: Vec<Step>,
}

/// 脚本中的一步；`click`/`drag`/`wheel` 使用屏幕坐标，`point` 使用世界坐标
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Mode {
        mode: DrawingMode,
    },
    Click {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    Point {
        x: f64,
        y: f64,
    },
    Drag {
        from: Point2,
        to: Point2,
    },
    Wheel {
        x: f64,
        y: f64,
        delta: f64,
    },
    Key {
        key: Key,
    },
    FinalizeBoundary,
    AddZone {
        name: String,
        #[serde(default)]
        purpose: ZonePurpose,
    },
    Finish,
    Update {
        patch: SelectionPatch,
    },
    Snap {
        enabled: bool,
    },
}

/// 回放输入脚本并保存设施几何
#[derive(Parser, Debug)]
#[command(name = "layoutcad", version, about = "Replay a LayoutCAD input script and save the facility geometry")]
struct Args {
    /// 输入脚本 (JSON)
    script: PathBuf,

    /// 初始设施载荷（.json 或 .lcad）
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// 输出路径，省略时打印载荷 JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 编辑器配置 (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(long, env = "LAYOUTCAD_DEBUG")]
    debug: bool,
}

fn run_step(editor: &mut Editor, step: Step) -> Result<(), GeometryError> {
    match step {
        Step::Mode { mode } => {
            editor.set_mode(mode);
        }
        Step::Click { x, y, shift } => {
            editor.handle_pointer(PointerEvent::Down {
                button: PointerButton::Primary,
                position: Point2::new(x, y),
                modifiers: Modifiers { shift },
            })?;
        }
        Step::Point { x, y } => {
            editor.click(Point2::new(x, y))?;
        }
        Step::Drag { from, to } => {
            editor.handle_pointer(PointerEvent::Down {
                button: PointerButton::Middle,
                position: from,
                modifiers: Modifiers::default(),
            })?;
            editor.handle_pointer(PointerEvent::Move { position: to })?;
            editor.handle_pointer(PointerEvent::Up {
                button: PointerButton::Middle,
                position: to,
            })?;
        }
        Step::Wheel { x, y, delta } => {
            editor.handle_pointer(PointerEvent::Wheel {
                position: Point2::new(x, y),
                delta,
            })?;
        }
        Step::Key { key } => {
            editor.handle_key(key)?;
        }
        Step::FinalizeBoundary => {
            editor.finalize_boundary()?;
        }
        Step::AddZone { name, purpose } => {
            editor.add_zone(name, purpose)?;
        }
        Step::Finish => {
            editor.finish()?;
        }
        Step::Update { patch } => {
            editor.update_selected(patch)?;
        }
        Step::Snap { enabled } => editor.set_snap_enabled(enabled),
    }
    Ok(())
}

fn load_script(path: &Path) -> Result<Script> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid script {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish(),
    )?;


    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    let mut editor = match &args.input {
        Some(path) => {
            let payload = native::load(path)?;
            Editor::from_payload(config, &payload)?
        }
        None => Editor::new(config),
    };

    let script = load_script(&args.script)?;
    if let Some(info) = script.facility {
        editor.set_facility_info(info);
    }

    let total = script.steps.len();
    let mut rejected = 0;
    for (index, step) in script.steps.into_iter().enumerate() {
        // 校验失败不中断回放
        if let Err(e) = run_step(&mut editor, step) {
            rejected += 1;
            warn!("Step {} rejected: {}", index + 1, e);
        }
    }

    let store = editor.store();
    info!(
        "Replayed {} steps ({} rejected): {} obstructions, {} zones, {} measurements",
        total,
        rejected,
        store.obstructions().count(),
        store.zone_count(),
        store.measurements().count()
    );
    info!(
        "Total area {:.1}, usable area {:.1}",
        store.total_area(),
        store.usable_area()
    );

    let payload = editor.save()?;
    match &args.output {
        Some(path) => native::save(&payload, path)?,
        None => println!("{}", payload.to_json()?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "layoutcad",
            "demos/warehouse.json",
            "-o",
            "out.lcad",
            "--config",
            "editor.json",
        ])
        .unwrap();
        assert_eq!(args.script, PathBuf::from("demos/warehouse.json"));
        assert_eq!(args.output, Some(PathBuf::from("out.lcad")));
        assert_eq!(args.config, Some(PathBuf::from("editor.json")));
        assert_eq!(args.input, None);

        assert!(Args::try_parse_from(["layoutcad"]).is_err());
        assert!(Args::try_parse_from(["layoutcad", "a.json", "--bogus"]).is_err());
    }

    #[test]
    fn test_script_steps() {
        let script: Script = serde_json::from_str(
            r#"{"steps": [
                {"op": "key", "key": {"shortcut": "c"}},
                {"op": "point", "x": 20.0, "y": 20.0},
                {"op": "key", "key": "escape"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(script.steps.len(), 3);

        let mut editor = Editor::default();
        for step in script.steps {
            run_step(&mut editor, step).unwrap();
        }
        assert_eq!(editor.mode(), DrawingMode::Column);
        assert_eq!(editor.store().obstructions().count(), 1);
    }
}
