use std::path::PathBuf;

use anyhow::{bail, Context};
use inpainter::geometry::Point;

const USAGE: &str = "usage: inpainter <image> <x> <y> <width> <height> [feather]";
const MASK_FILE_NAME: &str = "inpainter-mask.png";

struct Args {
    image: PathBuf,
    origin: Point,
    size: (f64, f64),
    feather: Option<u32>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let image = args.next().context(USAGE)?;
    let mut number = |name: &str| -> anyhow::Result<f64> {
        let raw = args.next().with_context(|| format!("missing {name}; {USAGE}"))?;
        raw.parse::<f64>()
            .with_context(|| format!("invalid {name}: {raw}"))
    };
    let origin = Point::new(number("x")?, number("y")?);
    let size = (number("width")?, number("height")?);
    let feather = match args.next() {
        Some(raw) => Some(
            raw.parse::<u32>()
                .with_context(|| format!("invalid feather radius: {raw}"))?,
        ),
        None => None,
    };
    if args.next().is_some() {
        bail!(USAGE);
    }
    Ok(Args {
        image: PathBuf::from(image),
        origin,
        size,
        feather,
    })
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let mut session = inpainter::start();
    if let Some(feather) = args.feather {
        session.set_feather_radius(feather);
    }

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    session
        .load_bytes(&bytes, None)
        .with_context(|| format!("failed to load {}", args.image.display()))?;

    let end = Point::new(args.origin.x + args.size.0, args.origin.y + args.size.1);
    session.pointer_down(0, args.origin)?;
    session.pointer_move(0, end)?;
    let bounds = session
        .pointer_up(0, end)
        .context("selection was rejected")?
        .context("selection did not commit")?;

    let payload = session
        .build_mask()
        .context("no selection to build a mask from")?;
    let encoded = payload.encode()?;
    std::fs::write(MASK_FILE_NAME, &encoded.mask_png)
        .with_context(|| format!("failed to write {MASK_FILE_NAME}"))?;
    std::fs::write(
        inpainter::session::PATCH_FILE_NAME,
        session.export_patch_png()?,
    )
    .with_context(|| format!("failed to write {}", inpainter::session::PATCH_FILE_NAME))?;

    tracing::info!(
        ?bounds,
        feather = session.feather_radius(),
        mask = MASK_FILE_NAME,
        patch = inpainter::session::PATCH_FILE_NAME,
        "mask and patch written"
    );
    Ok(())
}
