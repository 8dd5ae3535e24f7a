pub mod bitboard;
pub mod evaluation;
pub mod move_gen;
pub mod perft;
pub mod position;
pub mod search;
pub mod see;
pub mod transposition_table;

pub use bitboard::{BitBoard, Square};
pub use evaluation::{Eval, EvaluatePosition, MaterialEvaluator, POSITION_EVALUATOR};
pub use move_gen::{GenerateMoves, MagicMoveGen, MoveList, MOVE_GEN};
pub use perft::{perft, perft_detailed, perft_divide};
pub use position::zobrist_hash::{ZobristError, ZobristKeys};
pub use position::{GameStatus, Move, Piece, Position, PositionError, Side, START_FEN};
pub use search::{search, search_with_reporter, SearchError, SearchParams, SearchResult, SearchSnapshot, SearchStats};
pub use see::see;
pub use transposition_table::{Bound, TranspositionTable};
