mod fixture;

mod animation;
mod layer;
