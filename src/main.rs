use avl_ordered_set::avl_tree::AvlSet;
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let mut set = AvlSet::from([5, 3, 8, 1, 4]);
    info!("built {:?} with height {}", set, set.height());

    set.remove(&3);
    info!("after removing 3: {:?}", set);

    let mut cursor = set.lower_bound(&6);
    info!("lower bound of 6 is {}", cursor.get(&set)?);

    cursor.move_prev(&set)?;
    info!("its predecessor is {}", cursor.get(&set)?);

    let copy = set.clone();
    set.clear();
    info!("cleared the original, the copy still holds {:?}", copy);

    Ok(())
}
