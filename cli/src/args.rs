use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use domain::{
    color::ColorKey,
    coords::{Anchor, TileCoord},
    palette,
};

/// tile-overlay - line template images up with canvas tiles and draw them in
#[derive(Parser)]
#[command(name = "tile-overlay")]
#[command(about = "Align template images with canvas tiles and composite them over raw tiles")]
#[command(version)]
pub struct Cli {
    /// Directory searched for overlay.toml and overlay.json
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    /// Templates document to use instead of the configured storage path
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a template image, replacing one with the same name and anchor
    Add {
        /// Image file (PNG, WebP, ...)
        image: PathBuf,

        /// Where the image's top-left pixel goes: tileX,tileY,pixelX,pixelY
        #[arg(short, long)]
        anchor: Anchor,

        /// Defaults to the image file name
        #[arg(short, long)]
        name: Option<String>,

        /// Upscale factor for the center-dot rendering (1-16)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=16))]
        scale: Option<u32>,

        /// Start with premium colors hidden
        #[arg(long)]
        no_premium: bool,

        /// Colors to start hidden, as r,g,b or palette name (repeatable)
        #[arg(long = "disable", value_name = "COLOR", value_parser = parse_color)]
        disabled: Vec<ColorKey>,
    },

    /// List templates
    List {
        /// Also show each template's colors, most used first
        #[arg(long)]
        colors: bool,
    },

    /// Turn drawing of a template on or off
    Toggle {
        /// List position (1-based), name, or id prefix
        template: String,

        #[arg(value_enum)]
        state: Switch,
    },

    /// Turn one color of a template on or off
    Color {
        /// List position (1-based), name, or id prefix
        template: String,

        /// r,g,b or palette name
        #[arg(value_parser = parse_color)]
        color: ColorKey,

        #[arg(value_enum)]
        state: Switch,
    },

    /// Delete a template
    Remove {
        /// List position (1-based), name, or id prefix
        template: String,
    },

    /// Composite one raw tile image
    Render {
        /// Tile coordinate: tileX,tileY
        #[arg(short, long, value_parser = parse_tile)]
        tile: TileCoord,

        /// Raw tile as served by the host
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Composite every {tileX}/{tileY}.png below a directory
    RenderDir {
        input: PathBuf,

        output: PathBuf,
    },

    /// Show the template color expected at a pixel
    Pick {
        /// tileX,tileY,pixelX,pixelY
        anchor: Anchor,
    },

    /// Write the templates document to a file or stdout
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all templates with the contents of a templates document
    Import { input: PathBuf },

    /// Print the paint palette
    Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

pub fn parse_tile(s: &str) -> Result<TileCoord, String> {
    match s.split_once(',') {
        Some((x, y)) => {
            let x = x.trim().parse::<u32>().map_err(|e| format!("tile x: {e}"))?;
            let y = y.trim().parse::<u32>().map_err(|e| format!("tile y: {e}"))?;
            Ok(TileCoord::new(x, y))
        }
        None => Err(format!("'{s}' is not tileX,tileY")),
    }
}

/// Accepts a color key (`r,g,b`, `other`) or a palette name, case-insensitive.
pub fn parse_color(s: &str) -> Result<ColorKey, String> {
    if let Ok(key) = s.parse::<ColorKey>() {
        return Ok(key);
    }
    palette::entries()
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(s.trim()))
        .map(|entry| ColorKey::Rgb(entry.rgb))
        .ok_or_else(|| format!("'{s}' is neither r,g,b nor a palette color name"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use domain::color::RgbColor;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn colors_parse_by_key_or_name() {
        let red = ColorKey::Rgb(RgbColor::new(237, 28, 36));
        assert_eq!(parse_color("237,28,36"), Ok(red));
        assert_eq!(parse_color("red"), Ok(red));
        assert_eq!(parse_color("other"), Ok(ColorKey::Other));
        assert!(parse_color("mauve-ish").is_err());
    }

    #[test]
    fn tiles_parse() {
        assert_eq!(parse_tile("3, 4"), Ok(TileCoord::new(3, 4)));
        assert!(parse_tile("3").is_err());
        assert!(parse_tile("a,4").is_err());
    }

    #[test]
    fn add_accepts_repeated_disable() {
        let cli = Cli::try_parse_from([
            "tile-overlay",
            "add",
            "castle.png",
            "--anchor",
            "1,2,3,4",
            "--disable",
            "black",
            "--disable",
            "255,255,255",
        ])
        .unwrap();
        match cli.command {
            Command::Add {
                anchor, disabled, ..
            } => {
                assert_eq!(anchor, Anchor::new(1, 2, 3, 4));
                assert_eq!(disabled.len(), 2);
            }
            _ => panic!("expected add"),
        }
    }
}
